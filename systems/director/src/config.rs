//! TOML configuration of a simulation run.

use std::{fs, io, path::Path, time::Duration};

use path_defence_core::{
    EnemyKind, GridPosition, Position, Turret, DEFAULT_ENEMY_TICK, DEFAULT_LEAK_HEALTH_PENALTY,
    DEFAULT_TURRET_TICK,
};
use path_defence_enemy_agent::EnemyAgentConfig;
use path_defence_turret_agent::TurretAgentConfig;
use path_defence_waves::ArchetypeFactory;
use path_defence_world::{MapError, PlayerTotals, TileMap};
use serde::Deserialize;

/// Map used when the configuration does not provide a layout.
pub const DEFAULT_LAYOUT: &str = "
R>>>v.....
....v.....
....>>>>v.
........v.
........>>
..........
";

/// Reasons a configuration can be rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },
    /// The configuration is not valid TOML for this schema.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Underlying TOML error.
        #[from]
        source: toml::de::Error,
    },
    /// The map layout is malformed.
    #[error("invalid map: {source}")]
    Map {
        /// Underlying layout error.
        #[from]
        source: MapError,
    },
    /// A tick interval was configured as zero.
    #[error("{field} must be positive")]
    ZeroTick {
        /// Name of the offending field.
        field: &'static str,
    },
    /// An archetype starts without hit points.
    #[error("{kind:?} enemies must start with positive health, got {health}")]
    InvalidHealth {
        /// Offending archetype.
        kind: EnemyKind,
        /// Configured health.
        health: i64,
    },
    /// An archetype speed is zero or does not divide the tile size.
    #[error("{kind:?} speed {speed} must be positive and divide the tile size {tile_size}")]
    InvalidSpeed {
        /// Offending archetype.
        kind: EnemyKind,
        /// Configured speed.
        speed: u32,
        /// Configured tile size.
        tile_size: u32,
    },
    /// A turret was configured with unusable parameters.
    #[error("turret #{index}: {reason}")]
    InvalidTurret {
        /// Zero-based index in the `turrets` list.
        index: usize,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Complete description of a simulation run.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Agent tick intervals.
    pub timing: TimingConfig,
    /// Game rules.
    pub rules: RulesConfig,
    /// Map geometry.
    pub map: MapConfig,
    /// Per-archetype enemy attributes.
    pub archetypes: ArchetypeFactory,
    /// Turrets placed when the run starts.
    pub turrets: Vec<TurretPlacement>,
    /// Starting player statistics.
    pub player: PlayerConfig,
}

/// Agent tick intervals in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Interval between two enemy ticks.
    pub enemy_tick_ms: u64,
    /// Interval between two turret ticks.
    pub turret_tick_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            enemy_tick_ms: millis(DEFAULT_ENEMY_TICK),
            turret_tick_ms: millis(DEFAULT_TURRET_TICK),
        }
    }
}

/// Game rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    /// Health the player loses per leaked enemy.
    pub leak_health_penalty: i64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            leak_health_penalty: DEFAULT_LEAK_HEALTH_PENALTY,
        }
    }
}

/// Map geometry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    /// Side length of a tile in world units.
    pub tile_size: u32,
    /// Text layout, see [`TileMap::parse`].
    pub layout: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_size: 40,
            layout: DEFAULT_LAYOUT.to_owned(),
        }
    }
}

/// A turret standing in the centre of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TurretPlacement {
    /// Tile column.
    pub column: u32,
    /// Tile row.
    pub row: u32,
    /// Targeting range in world units.
    pub range: f64,
    /// Shots per second.
    pub fire_rate: f64,
    /// Damage per bullet.
    pub damage: i64,
}

impl TurretPlacement {
    /// Builds the turret for a map with tiles of `tile_size`.
    #[must_use]
    pub fn turret(&self, tile_size: u32) -> Turret {
        let corner = GridPosition::new(self.column, self.row).to_position(tile_size);
        let half = f64::from(tile_size) / 2.0;
        Turret {
            position: Position::new(corner.x() + half, corner.y() + half),
            range: self.range,
            fire_rate: self.fire_rate,
            damage: self.damage,
        }
    }
}

/// Starting player statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Lives.
    pub health: i64,
    /// Currency.
    pub money: i64,
    /// Score.
    pub score: i64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            health: 20,
            money: 100,
            score: 0,
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Checks every invariant the agents rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.enemy_tick_ms == 0 {
            return Err(ConfigError::ZeroTick {
                field: "timing.enemy_tick_ms",
            });
        }
        if self.timing.turret_tick_ms == 0 {
            return Err(ConfigError::ZeroTick {
                field: "timing.turret_tick_ms",
            });
        }

        let map = self.tile_map()?;
        let tile_size = self.map.tile_size;
        for kind in EnemyKind::ALL {
            let stats = self.archetypes.stats(kind);
            if stats.health <= 0 {
                return Err(ConfigError::InvalidHealth {
                    kind,
                    health: stats.health,
                });
            }
            if stats.speed == 0 || tile_size % stats.speed != 0 {
                return Err(ConfigError::InvalidSpeed {
                    kind,
                    speed: stats.speed,
                    tile_size,
                });
            }
        }

        for (index, placement) in self.turrets.iter().enumerate() {
            let reason = if placement.column >= map.columns() || placement.row >= map.rows() {
                Some("placed outside the map")
            } else if !placement.fire_rate.is_finite() || placement.fire_rate <= 0.0 {
                Some("fire rate must be positive")
            } else if !placement.range.is_finite() || placement.range < 0.0 {
                Some("range must not be negative")
            } else if placement.damage < 0 {
                Some("damage must not be negative")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(ConfigError::InvalidTurret { index, reason });
            }
        }

        Ok(())
    }

    /// Parses the configured layout.
    pub fn tile_map(&self) -> Result<TileMap, ConfigError> {
        Ok(TileMap::parse(&self.map.layout, self.map.tile_size)?)
    }

    /// Tunables handed to every enemy agent.
    #[must_use]
    pub fn enemy_agent_config(&self) -> EnemyAgentConfig {
        EnemyAgentConfig {
            tick: Duration::from_millis(self.timing.enemy_tick_ms),
            leak_health_penalty: self.rules.leak_health_penalty,
        }
    }

    /// Tunables handed to every turret agent.
    #[must_use]
    pub fn turret_agent_config(&self) -> TurretAgentConfig {
        TurretAgentConfig {
            tick: Duration::from_millis(self.timing.turret_tick_ms),
        }
    }

    /// Player statistics at the start of the run.
    #[must_use]
    pub const fn player_totals(&self) -> PlayerTotals {
        PlayerTotals {
            health: self.player.health,
            money: self.player.money,
            score: self.player.score,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
