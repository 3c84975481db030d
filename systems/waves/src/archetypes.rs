use path_defence_core::{Enemy, EnemyFactory, EnemyKind, Position};
use serde::Deserialize;

/// Starting attributes shared by every enemy of one archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchetypeStats {
    /// Starting hit points.
    pub health: i64,
    /// World units travelled per tick.
    pub speed: u32,
    /// Money and score granted on kill; score lost on leak.
    pub reward: i64,
}

/// Enemy factory backed by a table of per-archetype attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchetypeFactory {
    /// Attributes of [`EnemyKind::Heavy`] enemies.
    pub heavy: ArchetypeStats,
    /// Attributes of [`EnemyKind::Light`] enemies.
    pub light: ArchetypeStats,
    /// Attributes of [`EnemyKind::Medium`] enemies.
    pub medium: ArchetypeStats,
}

impl Default for ArchetypeFactory {
    fn default() -> Self {
        Self {
            heavy: ArchetypeStats {
                health: 300,
                speed: 1,
                reward: 30,
            },
            light: ArchetypeStats {
                health: 80,
                speed: 4,
                reward: 10,
            },
            medium: ArchetypeStats {
                health: 150,
                speed: 2,
                reward: 20,
            },
        }
    }
}

impl ArchetypeFactory {
    /// Attributes configured for `kind`.
    #[must_use]
    pub const fn stats(&self, kind: EnemyKind) -> ArchetypeStats {
        match kind {
            EnemyKind::Heavy => self.heavy,
            EnemyKind::Light => self.light,
            EnemyKind::Medium => self.medium,
        }
    }
}

impl EnemyFactory for ArchetypeFactory {
    fn create(&self, kind: EnemyKind, position: Position) -> Enemy {
        let stats = self.stats(kind);
        Enemy {
            kind,
            position,
            health: stats.health,
            speed: stats.speed,
            reward: stats.reward,
        }
    }
}
