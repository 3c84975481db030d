//! Thread-safe player statistics fed by terminal enemy events.

use parking_lot::Mutex;
use path_defence_core::StatsSink;
use tracing::debug;

/// Health, money and score of the player at a point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerTotals {
    /// Remaining lives.
    pub health: i64,
    /// Spendable currency.
    pub money: i64,
    /// Accumulated score.
    pub score: i64,
}

/// Stats sink that serialises concurrent deltas behind a lock.
#[derive(Debug, Default)]
pub struct PlayerStats {
    totals: Mutex<PlayerTotals>,
}

impl PlayerStats {
    /// Creates a sink starting from `initial`.
    #[must_use]
    pub fn new(initial: PlayerTotals) -> Self {
        Self {
            totals: Mutex::new(initial),
        }
    }

    /// Current totals.
    #[must_use]
    pub fn snapshot(&self) -> PlayerTotals {
        *self.totals.lock()
    }

    /// Reports whether the player ran out of health.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.totals.lock().health <= 0
    }
}

impl StatsSink for PlayerStats {
    fn apply_health(&self, delta: i64) {
        let mut totals = self.totals.lock();
        totals.health = totals.health.saturating_add(delta);
        debug!(delta, health = totals.health, "player health changed");
    }

    fn apply_money(&self, delta: i64) {
        let mut totals = self.totals.lock();
        totals.money = totals.money.saturating_add(delta);
        debug!(delta, money = totals.money, "player money changed");
    }

    fn apply_score(&self, delta: i64) {
        let mut totals = self.totals.lock();
        totals.score = totals.score.saturating_add(delta);
        debug!(delta, score = totals.score, "player score changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread};

    #[test]
    fn deltas_accumulate_from_many_threads() {
        let stats = Arc::new(PlayerStats::new(PlayerTotals {
            health: 20,
            money: 0,
            score: 0,
        }));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for _ in 0..100 {
                        stats.apply_money(3);
                        stats.apply_score(-1);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("worker finished");
        }

        let totals = stats.snapshot();
        assert_eq!(totals.money, 2_400);
        assert_eq!(totals.score, -800);
        assert_eq!(totals.health, 20);
    }

    #[test]
    fn defeat_follows_health() {
        let stats = PlayerStats::new(PlayerTotals {
            health: 1,
            ..PlayerTotals::default()
        });
        assert!(!stats.is_defeated());
        stats.apply_health(-1);
        assert!(stats.is_defeated());
    }
}
