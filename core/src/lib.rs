#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Path Defence simulation.
//!
//! This crate defines the value objects and collaborator traits that connect
//! the grid, the enemy and turret agents, and the surrounding application.
//! Factories build [`Enemy`] and [`Turret`] values, agents publish their live
//! state through [`EnemyHandle`] and [`TurretHandle`], and terminal events
//! leave the core exclusively through [`StatsSink`] and [`BulletSink`].

mod agent_state;

use std::time::Duration;

use glam::DVec2;
use serde::{Deserialize, Serialize};

pub use agent_state::{EnemyHandle, TurretHandle, TurretSnapshot, WeakEnemyHandle};

/// Default interval between two enemy ticks.
pub const DEFAULT_ENEMY_TICK: Duration = Duration::from_millis(8);

/// Default interval between two turret ticks.
pub const DEFAULT_TURRET_TICK: Duration = Duration::from_millis(20);

/// Health removed from the player whenever an enemy leaks through the map.
pub const DEFAULT_LEAK_HEALTH_PENALTY: i64 = 1;

/// Continuous location expressed in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f64,
    y: f64,
}

impl Position {
    /// Creates a new position from its coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Vertical coordinate, growing downwards.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance_to(self, other: Position) -> f64 {
        self.as_vec().distance(other.as_vec())
    }

    /// Angle in radians of the ray from `self` towards `other`.
    #[must_use]
    pub fn bearing_to(self, other: Position) -> f64 {
        let delta = other.as_vec() - self.as_vec();
        delta.y.atan2(delta.x)
    }

    /// Moves the position `distance` world units along `direction`.
    #[must_use]
    pub fn translated(self, direction: Direction, distance: f64) -> Self {
        let (dx, dy) = direction.unit_vector();
        Self::new(
            self.x + f64::from(dx) * distance,
            self.y + f64::from(dy) * distance,
        )
    }

    fn as_vec(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// Location of a single tile expressed as column and row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    column: u32,
    row: u32,
}

impl GridPosition {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Resolves the tile containing `position`.
    ///
    /// Positions left of or above the grid origin have no tile, as does any
    /// position when `tile_size` is zero.
    #[must_use]
    pub fn from_position(position: Position, tile_size: u32) -> Option<Self> {
        if tile_size == 0 || position.x() < 0.0 || position.y() < 0.0 {
            return None;
        }

        let size = f64::from(tile_size);
        let column = (position.x() / size).floor();
        let row = (position.y() / size).floor();
        if column > f64::from(u32::MAX) || row > f64::from(u32::MAX) {
            return None;
        }

        Some(Self::new(column as u32, row as u32))
    }

    /// Top-left corner of the tile in world units.
    #[must_use]
    pub fn to_position(self, tile_size: u32) -> Position {
        let size = f64::from(tile_size);
        Position::new(f64::from(self.column) * size, f64::from(self.row) * size)
    }
}

/// Movement direction recorded on a path tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing rows.
    Up,
    /// Movement toward increasing rows.
    Down,
    /// Movement toward decreasing columns.
    Left,
    /// Movement toward increasing columns.
    Right,
}

impl Direction {
    /// Unit vector `(dx, dy)` in screen coordinates.
    #[must_use]
    pub const fn unit_vector(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Unique identifier assigned to an enemy when it joins the roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a placed turret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TurretId(u32);

impl TurretId {
    /// Creates a new turret identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Archetypes of enemies that can appear in a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Slow, heavily armoured enemy. Wave code `1`.
    Heavy,
    /// Fast, fragile enemy. Wave code `2`.
    Light,
    /// Balanced enemy. Wave code `3`.
    Medium,
}

impl EnemyKind {
    /// Every archetype in wave-code order.
    pub const ALL: [EnemyKind; 3] = [Self::Heavy, Self::Light, Self::Medium];

    /// Resolves the archetype encoded by a wave-file token.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::Heavy),
            "2" => Some(Self::Light),
            "3" => Some(Self::Medium),
            _ => None,
        }
    }

    /// Wave-file token that encodes the archetype.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Heavy => 1,
            Self::Light => 2,
            Self::Medium => 3,
        }
    }
}

/// Freshly constructed enemy, not yet registered with a roster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Enemy {
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Location where the enemy enters the map.
    pub position: Position,
    /// Starting hit points; always positive.
    pub health: i64,
    /// World units travelled per tick.
    pub speed: u32,
    /// Money and score granted when the enemy is killed.
    pub reward: i64,
}

/// Freshly constructed turret, not yet placed on the map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Turret {
    /// Location of the turret's pivot.
    pub position: Position,
    /// Maximum targeting distance in world units.
    pub range: f64,
    /// Shots per second while a target is locked.
    pub fire_rate: f64,
    /// Damage carried by every bullet.
    pub damage: i64,
}

impl Turret {
    /// Interval between two shots of the firing cadence.
    ///
    /// Non-positive or non-finite fire rates yield `None`.
    #[must_use]
    pub fn fire_period(&self) -> Option<Duration> {
        if !self.fire_rate.is_finite() || self.fire_rate <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(1.0 / self.fire_rate).ok()
    }
}

/// Projectile emitted by a turret's firing cadence.
#[derive(Clone, Debug)]
pub struct Bullet {
    /// Turret that fired the bullet.
    pub turret: TurretId,
    /// Enemy the bullet was aimed at, resolved without touching the roster.
    pub target: WeakEnemyHandle,
    /// Location the bullet leaves from.
    pub origin: Position,
    /// Heading of the bullet in radians.
    pub angle: f64,
    /// Damage applied on impact.
    pub damage: i64,
}

/// Read-only description of the map path consulted by enemy agents.
pub trait PathGrid: Send + Sync {
    /// Side length of a square tile in world units.
    fn tile_size(&self) -> u32;

    /// Direction recorded on the tile containing `position`, if any.
    fn direction_at(&self, position: Position) -> Option<Direction>;

    /// Reports whether `position` lies at or beyond the traversable bounds.
    fn is_out_of_bounds(&self, position: Position) -> bool;
}

/// Receiver of the player stat deltas produced by terminal enemy events.
///
/// Implementations must serialise concurrent calls themselves.
pub trait StatsSink: Send + Sync {
    /// Applies a signed change to the player's health.
    fn apply_health(&self, delta: i64);

    /// Applies a signed change to the player's money.
    fn apply_money(&self, delta: i64);

    /// Applies a signed change to the player's score.
    fn apply_score(&self, delta: i64);
}

/// Combat collaborator notified about every bullet a turret fires.
pub trait BulletSink: Send + Sync {
    /// Handles a bullet emitted by a firing cadence.
    fn bullet_created(&self, bullet: Bullet);
}

/// Builds enemies for wave definitions.
pub trait EnemyFactory {
    /// Creates an enemy of the requested archetype at `position`.
    fn create(&self, kind: EnemyKind, position: Position) -> Enemy;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_and_bearing_follow_screen_axes() {
        let origin = Position::new(0.0, 0.0);
        let east = Position::new(3.0, 4.0);
        assert!((origin.distance_to(east) - 5.0).abs() < f64::EPSILON);

        let below = Position::new(0.0, 10.0);
        let bearing = origin.bearing_to(below);
        assert!((bearing - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn translation_uses_unit_vectors() {
        let start = Position::new(40.0, 40.0);
        assert_eq!(
            start.translated(Direction::Up, 2.0),
            Position::new(40.0, 38.0)
        );
        assert_eq!(
            start.translated(Direction::Left, 4.0),
            Position::new(36.0, 40.0)
        );
        assert_eq!(
            start.translated(Direction::Down, 1.0),
            Position::new(40.0, 41.0)
        );
        assert_eq!(
            start.translated(Direction::Right, 1.0),
            Position::new(41.0, 40.0)
        );
    }

    #[test]
    fn grid_position_floors_and_rejects_negative_coordinates() {
        assert_eq!(
            GridPosition::from_position(Position::new(79.0, 40.0), 40),
            Some(GridPosition::new(1, 1))
        );
        assert_eq!(
            GridPosition::from_position(Position::new(-1.0, 0.0), 40),
            None
        );
        assert_eq!(GridPosition::from_position(Position::new(1.0, 1.0), 0), None);
        assert_eq!(
            GridPosition::new(2, 3).to_position(40),
            Position::new(80.0, 120.0)
        );
    }

    #[test]
    fn enemy_codes_match_wave_format() {
        for kind in EnemyKind::ALL {
            assert_eq!(EnemyKind::from_code(&kind.code().to_string()), Some(kind));
        }
        assert_eq!(EnemyKind::from_code("4"), None);
        assert_eq!(EnemyKind::from_code(""), None);
    }

    #[test]
    fn fire_period_inverts_fire_rate() {
        let mut turret = Turret {
            position: Position::default(),
            range: 100.0,
            fire_rate: 4.0,
            damage: 10,
        };
        assert_eq!(turret.fire_period(), Some(Duration::from_millis(250)));

        turret.fire_rate = 0.0;
        assert_eq!(turret.fire_period(), None);
    }
}
