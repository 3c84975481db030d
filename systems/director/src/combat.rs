use std::sync::atomic::{AtomicU64, Ordering};

use path_defence_core::{Bullet, BulletSink};
use tracing::trace;

/// Combat collaborator that resolves every bullet on the spot.
///
/// Bullets carry a weak reference to their target, so resolving one never
/// takes the roster lock. Bullets aimed at enemies that already left the
/// roster are dropped.
#[derive(Debug, Default)]
pub struct HitscanCombat {
    fired: AtomicU64,
    hits: AtomicU64,
}

impl HitscanCombat {
    /// Creates a collaborator with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bullets received so far.
    #[must_use]
    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::Acquire)
    }

    /// Bullets that damaged an enemy.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Acquire)
    }
}

impl BulletSink for HitscanCombat {
    fn bullet_created(&self, bullet: Bullet) {
        let _ = self.fired.fetch_add(1, Ordering::AcqRel);
        let Some(enemy) = bullet.target.listed() else {
            return;
        };
        let remaining = enemy.apply_damage(bullet.damage);
        let _ = self.hits.fetch_add(1, Ordering::AcqRel);
        trace!(
            turret = bullet.turret.get(),
            enemy = enemy.id().get(),
            remaining,
            "bullet hit"
        );
    }
}
