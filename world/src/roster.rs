//! Lock-protected collection of live enemies.

use std::{collections::BTreeMap, sync::Arc};

use parking_lot::Mutex;
use path_defence_core::{Enemy, EnemyHandle, EnemyId};
use tracing::debug;

/// Set of enemies whose agents are still running.
///
/// A single mutex guards every insertion, removal and full scan, so a turret
/// searching for a target always observes a consistent population. Clones
/// share the same underlying state.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    shared: Arc<Mutex<RosterState>>,
}

#[derive(Debug, Default)]
struct RosterState {
    enemies: BTreeMap<EnemyId, EnemyHandle>,
    next_id: u32,
    spawned: u64,
    removed: u64,
}

/// Lifetime bookkeeping of a roster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RosterCounters {
    /// Enemies that ever joined the roster.
    pub spawned: u64,
    /// Enemies that left the roster.
    pub removed: u64,
}

impl RosterCounters {
    /// Enemies currently in the roster.
    #[must_use]
    pub const fn live(&self) -> u64 {
        self.spawned.saturating_sub(self.removed)
    }
}

impl Roster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `enemy`, allocating its identifier.
    pub fn insert(&self, enemy: &Enemy) -> EnemyHandle {
        let mut state = self.shared.lock();
        let id = EnemyId::new(state.next_id);
        state.next_id = state.next_id.saturating_add(1);
        state.spawned = state.spawned.saturating_add(1);

        let handle = EnemyHandle::new(id, enemy);
        let _ = state.enemies.insert(id, handle.clone());
        debug!(enemy = id.get(), kind = ?enemy.kind, "enemy joined roster");
        handle
    }

    /// Removes the enemy and retires its handle.
    ///
    /// Returns `true` only for the call that actually removed the enemy, so
    /// callers can attach exactly-once side effects to the result.
    pub fn remove(&self, id: EnemyId) -> bool {
        let mut state = self.shared.lock();
        let Some(handle) = state.enemies.remove(&id) else {
            return false;
        };
        let _ = handle.retire();
        state.removed = state.removed.saturating_add(1);
        debug!(enemy = id.get(), "enemy left roster");
        true
    }

    /// Looks up a live enemy by identifier.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<EnemyHandle> {
        self.shared.lock().enemies.get(&id).cloned()
    }

    /// Reports whether the enemy is still in the roster.
    #[must_use]
    pub fn contains(&self, id: EnemyId) -> bool {
        self.shared.lock().enemies.contains_key(&id)
    }

    /// Number of enemies in the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.lock().enemies.len()
    }

    /// Reports whether the roster holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.lock().enemies.is_empty()
    }

    /// Lifetime insertion and removal counts.
    #[must_use]
    pub fn counters(&self) -> RosterCounters {
        let state = self.shared.lock();
        RosterCounters {
            spawned: state.spawned,
            removed: state.removed,
        }
    }

    /// Copies the handles of every live enemy in spawn order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<EnemyHandle> {
        self.shared.lock().enemies.values().cloned().collect()
    }

    /// Runs `scan` with exclusive access to the roster.
    ///
    /// No enemy joins or leaves while `scan` runs; keep the closure short.
    pub fn scan<R>(&self, scan: impl FnOnce(RosterView<'_>) -> R) -> R {
        let state = self.shared.lock();
        scan(RosterView {
            enemies: &state.enemies,
        })
    }
}

/// Read-only view of the roster handed to [`Roster::scan`].
#[derive(Clone, Copy, Debug)]
pub struct RosterView<'a> {
    enemies: &'a BTreeMap<EnemyId, EnemyHandle>,
}

impl<'a> RosterView<'a> {
    /// Iterator over the live enemies in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &'a EnemyHandle> + 'a {
        self.enemies.values()
    }

    /// Number of enemies in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::{EnemyKind, Position};
    use std::thread;

    fn enemy() -> Enemy {
        Enemy {
            kind: EnemyKind::Light,
            position: Position::new(0.0, 0.0),
            health: 50,
            speed: 4,
            reward: 10,
        }
    }

    #[test]
    fn identifiers_follow_spawn_order() {
        let roster = Roster::new();
        let first = roster.insert(&enemy());
        let second = roster.insert(&enemy());
        assert_eq!(first.id(), EnemyId::new(0));
        assert_eq!(second.id(), EnemyId::new(1));

        let ids: Vec<_> = roster.scan(|view| view.iter().map(EnemyHandle::id).collect());
        assert_eq!(ids, vec![first.id(), second.id()]);
    }

    #[test]
    fn removal_succeeds_exactly_once() {
        let roster = Roster::new();
        let handle = roster.insert(&enemy());
        assert!(roster.remove(handle.id()));
        assert!(!roster.remove(handle.id()));
        assert!(handle.is_retired());
        assert!(!roster.contains(handle.id()));
        assert_eq!(
            roster.counters(),
            RosterCounters {
                spawned: 1,
                removed: 1
            }
        );
    }

    #[test]
    fn concurrent_removals_keep_counters_consistent() {
        let roster = Roster::new();
        let handles: Vec<_> = (0..64).map(|_| roster.insert(&enemy())).collect();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let roster = roster.clone();
                let ids: Vec<_> = handles.iter().map(EnemyHandle::id).collect();
                thread::spawn(move || ids.into_iter().filter(|id| roster.remove(*id)).count())
            })
            .collect();
        let removed: usize = workers
            .into_iter()
            .map(|worker| worker.join().expect("worker finished"))
            .sum();

        assert_eq!(removed, 64, "every enemy is removed by exactly one worker");
        assert!(roster.is_empty());
        assert_eq!(roster.counters().live(), 0);
    }

    #[test]
    fn snapshot_excludes_removed_enemies() {
        let roster = Roster::new();
        let kept = roster.insert(&enemy());
        let dropped = roster.insert(&enemy());
        assert!(roster.remove(dropped.id()));

        let snapshot = roster.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id(), kept.id());
        assert_eq!(roster.get(dropped.id()).map(|h| h.id()), None);
        assert_eq!(roster.len(), 1);
    }
}
