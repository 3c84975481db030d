//! Live agent state shared between agent tasks and observers.

use std::sync::{
    atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering},
    Arc, Weak,
};

use parking_lot::Mutex;

use crate::{Enemy, EnemyId, EnemyKind, Position, Turret, TurretId};

#[derive(Debug)]
struct EnemyCell {
    id: EnemyId,
    kind: EnemyKind,
    speed: u32,
    reward: i64,
    health: AtomicI64,
    position: Mutex<Position>,
    progress: AtomicU64,
    retired: AtomicBool,
}

/// Shared view of an enemy that has joined a roster.
///
/// Position and progress are written only by the enemy's own agent. Health
/// may be lowered by any combat collaborator. Reads from other agents are
/// best-effort: a value may be one tick stale.
#[derive(Clone, Debug)]
pub struct EnemyHandle {
    cell: Arc<EnemyCell>,
}

impl EnemyHandle {
    /// Wraps `enemy` into shared live state under the provided identifier.
    #[must_use]
    pub fn new(id: EnemyId, enemy: &Enemy) -> Self {
        Self {
            cell: Arc::new(EnemyCell {
                id,
                kind: enemy.kind,
                speed: enemy.speed,
                reward: enemy.reward,
                health: AtomicI64::new(enemy.health),
                position: Mutex::new(enemy.position),
                progress: AtomicU64::new(0),
                retired: AtomicBool::new(false),
            }),
        }
    }

    /// Identifier allocated by the roster.
    #[must_use]
    pub fn id(&self) -> EnemyId {
        self.cell.id
    }

    /// Archetype of the enemy.
    #[must_use]
    pub fn kind(&self) -> EnemyKind {
        self.cell.kind
    }

    /// World units travelled per tick.
    #[must_use]
    pub fn speed(&self) -> u32 {
        self.cell.speed
    }

    /// Money and score granted on kill.
    #[must_use]
    pub fn reward(&self) -> i64 {
        self.cell.reward
    }

    /// Current location.
    #[must_use]
    pub fn position(&self) -> Position {
        *self.cell.position.lock()
    }

    /// Remaining hit points.
    #[must_use]
    pub fn health(&self) -> i64 {
        self.cell.health.load(Ordering::Acquire)
    }

    /// Total distance travelled along the path.
    #[must_use]
    pub fn progress(&self) -> u64 {
        self.cell.progress.load(Ordering::Acquire)
    }

    /// Reports whether the enemy still has hit points left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health() > 0
    }

    /// Reports whether the enemy has left its roster.
    #[must_use]
    pub fn is_retired(&self) -> bool {
        self.cell.retired.load(Ordering::Acquire)
    }

    /// Reports whether the enemy is alive and still in its roster.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.is_retired() && self.is_alive()
    }

    /// Lowers health by `amount`, returning the remaining hit points.
    ///
    /// Negative amounts are ignored so health never increases.
    pub fn apply_damage(&self, amount: i64) -> i64 {
        let amount = amount.max(0);
        let previous = self
            .cell
            .health
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |health| {
                Some(health.saturating_sub(amount))
            })
            .unwrap_or_else(|health| health);
        previous.saturating_sub(amount)
    }

    /// Publishes the outcome of one movement step.
    ///
    /// Only the enemy's own agent calls this.
    pub fn record_step(&self, position: Position, distance: u32) {
        *self.cell.position.lock() = position;
        let _ = self
            .cell
            .progress
            .fetch_add(u64::from(distance), Ordering::AcqRel);
    }

    /// Marks the enemy as removed from its roster.
    ///
    /// Returns `true` only for the first call.
    pub fn retire(&self) -> bool {
        !self.cell.retired.swap(true, Ordering::AcqRel)
    }

    /// Creates a non-owning reference to the enemy.
    #[must_use]
    pub fn downgrade(&self) -> WeakEnemyHandle {
        WeakEnemyHandle {
            id: self.cell.id,
            cell: Arc::downgrade(&self.cell),
        }
    }
}

/// Non-owning reference to an enemy, re-validated before every use.
#[derive(Clone, Debug)]
pub struct WeakEnemyHandle {
    id: EnemyId,
    cell: Weak<EnemyCell>,
}

impl WeakEnemyHandle {
    /// Identifier of the referenced enemy.
    #[must_use]
    pub fn id(&self) -> EnemyId {
        self.id
    }

    /// Resolves the reference while the enemy is alive and in its roster.
    #[must_use]
    pub fn live(&self) -> Option<EnemyHandle> {
        self.cell
            .upgrade()
            .map(|cell| EnemyHandle { cell })
            .filter(EnemyHandle::is_live)
    }

    /// Resolves the reference while the enemy is still in its roster,
    /// whatever its health.
    #[must_use]
    pub fn listed(&self) -> Option<EnemyHandle> {
        self.cell
            .upgrade()
            .map(|cell| EnemyHandle { cell })
            .filter(|handle| !handle.is_retired())
    }
}

#[derive(Debug)]
struct TurretCell {
    id: TurretId,
    turret: Turret,
    angle: Mutex<f64>,
    target: Mutex<Option<WeakEnemyHandle>>,
    firing: AtomicBool,
}

/// Shared view of a placed turret.
///
/// The target slot is private to the turret's own tick and firing tasks;
/// observers only read it.
#[derive(Clone, Debug)]
pub struct TurretHandle {
    cell: Arc<TurretCell>,
}

impl TurretHandle {
    /// Wraps `turret` into shared live state under the provided identifier.
    #[must_use]
    pub fn new(id: TurretId, turret: Turret) -> Self {
        Self {
            cell: Arc::new(TurretCell {
                id,
                turret,
                angle: Mutex::new(0.0),
                target: Mutex::new(None),
                firing: AtomicBool::new(false),
            }),
        }
    }

    /// Identifier allocated at placement.
    #[must_use]
    pub fn id(&self) -> TurretId {
        self.cell.id
    }

    /// Static turret parameters.
    #[must_use]
    pub fn turret(&self) -> &Turret {
        &self.cell.turret
    }

    /// Current facing in radians.
    #[must_use]
    pub fn angle(&self) -> f64 {
        *self.cell.angle.lock()
    }

    /// Rotates the turret to `angle` radians.
    pub fn set_angle(&self, angle: f64) {
        *self.cell.angle.lock() = angle;
    }

    /// Reference to the currently held target, live or not.
    #[must_use]
    pub fn target(&self) -> Option<WeakEnemyHandle> {
        self.cell.target.lock().clone()
    }

    /// Currently held target if it is still alive and in its roster.
    #[must_use]
    pub fn live_target(&self) -> Option<EnemyHandle> {
        self.cell
            .target
            .lock()
            .as_ref()
            .and_then(WeakEnemyHandle::live)
    }

    /// Replaces the held target.
    pub fn set_target(&self, target: Option<WeakEnemyHandle>) {
        *self.cell.target.lock() = target;
    }

    /// Reports whether the firing cadence is running.
    #[must_use]
    pub fn is_firing(&self) -> bool {
        self.cell.firing.load(Ordering::Acquire)
    }

    /// Records whether the firing cadence is running.
    pub fn set_firing(&self, firing: bool) {
        self.cell.firing.store(firing, Ordering::Release);
    }

    /// Captures the observable turret state.
    #[must_use]
    pub fn snapshot(&self) -> TurretSnapshot {
        TurretSnapshot {
            id: self.id(),
            position: self.cell.turret.position,
            angle: self.angle(),
            target: self.target().map(|target| target.id()),
            firing: self.is_firing(),
        }
    }
}

/// Immutable representation of a turret used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretSnapshot {
    /// Identifier allocated at placement.
    pub id: TurretId,
    /// Location of the turret's pivot.
    pub position: Position,
    /// Facing in radians.
    pub angle: f64,
    /// Enemy currently held as target.
    pub target: Option<EnemyId>,
    /// Whether the firing cadence is running.
    pub firing: bool,
}
