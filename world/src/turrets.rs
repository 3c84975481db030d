//! Registry of placed turrets and identifier allocation.

use std::collections::BTreeMap;

use path_defence_core::{Turret, TurretHandle, TurretId, TurretSnapshot};

/// Registry that stores placed turrets and manages identifier allocation.
#[derive(Debug, Default)]
pub struct TurretRegistry {
    entries: BTreeMap<TurretId, TurretHandle>,
    next_turret_id: u32,
}

impl TurretRegistry {
    /// Creates an empty turret registry with a reset identifier counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `turret`, returning its shared live state.
    pub fn place(&mut self, turret: Turret) -> TurretHandle {
        let id = TurretId::new(self.next_turret_id);
        self.next_turret_id = self.next_turret_id.saturating_add(1);
        let handle = TurretHandle::new(id, turret);
        let _ = self.entries.insert(id, handle.clone());
        handle
    }

    /// Removes a turret from the registry.
    pub fn remove(&mut self, id: TurretId) -> Option<TurretHandle> {
        self.entries.remove(&id)
    }

    /// Looks up a placed turret.
    #[must_use]
    pub fn get(&self, id: TurretId) -> Option<&TurretHandle> {
        self.entries.get(&id)
    }

    /// Number of placed turrets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no turret is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Captures every turret in identifier order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<TurretSnapshot> {
        self.entries.values().map(TurretHandle::snapshot).collect()
    }

    /// Removes and returns every turret.
    pub fn drain(&mut self) -> Vec<TurretHandle> {
        std::mem::take(&mut self.entries).into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::Position;

    fn turret() -> Turret {
        Turret {
            position: Position::new(60.0, 60.0),
            range: 100.0,
            fire_rate: 2.0,
            damage: 10,
        }
    }

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let mut registry = TurretRegistry::new();
        assert!(registry.is_empty());
        let first = registry.place(turret());
        let second = registry.place(turret());
        assert_eq!(first.id().get(), 0);
        assert_eq!(second.id().get(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn removal_and_drain_release_entries() {
        let mut registry = TurretRegistry::new();
        let first = registry.place(turret());
        let _ = registry.place(turret());

        assert!(registry.remove(first.id()).is_some());
        assert!(registry.remove(first.id()).is_none());
        assert!(registry.get(first.id()).is_none());
        assert_eq!(registry.snapshots().len(), 1);

        assert_eq!(registry.drain().len(), 1);
        assert!(registry.is_empty());
    }
}
