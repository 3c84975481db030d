#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autonomous control loop that walks a single enemy along the map path.
//!
//! Each tick first checks whether the enemy died, then advances it along the
//! direction recorded on the tile it entered, and finally checks whether it
//! left the map. Both terminal events remove the enemy from the roster and
//! report their stat deltas exactly once.

use std::{ops::ControlFlow, sync::Arc, time::Duration};

use path_defence_core::{
    Direction, EnemyHandle, PathGrid, Position, StatsSink, DEFAULT_ENEMY_TICK,
    DEFAULT_LEAK_HEALTH_PENALTY,
};
use path_defence_runtime::{run_ticks, AgentHandle, StopSignal};
use path_defence_world::Roster;
use tracing::{error, info};

/// Tunables for enemy agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyAgentConfig {
    /// Interval between two ticks.
    pub tick: Duration,
    /// Health removed from the player when the enemy leaks.
    pub leak_health_penalty: i64,
}

impl Default for EnemyAgentConfig {
    fn default() -> Self {
        Self {
            tick: DEFAULT_ENEMY_TICK,
            leak_health_penalty: DEFAULT_LEAK_HEALTH_PENALTY,
        }
    }
}

/// How an enemy agent ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyOutcome {
    /// Health dropped to zero; the player was rewarded.
    Killed,
    /// The enemy crossed a map boundary; the player was penalised.
    Leaked,
    /// The owner stopped the agent; the enemy left the roster without
    /// stat changes.
    Stopped,
    /// The enemy stood on a tile without a direction when it had to move.
    Faulted,
}

/// Sub-tile movement state of an enemy.
///
/// The direction is sampled from the grid only when the enemy sits on a
/// tile boundary, i.e. when the steps done inside the current tile are zero.
/// Sampling overwrites the stored direction, including with `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathFollower {
    steps_done: u32,
    direction: Option<Direction>,
    tile_size: u32,
}

impl PathFollower {
    /// Creates a follower positioned on a tile boundary.
    #[must_use]
    pub const fn new(tile_size: u32) -> Self {
        Self {
            steps_done: 0,
            direction: None,
            tile_size,
        }
    }

    /// Steps already taken inside the current tile.
    #[must_use]
    pub const fn steps_done(&self) -> u32 {
        self.steps_done
    }

    /// Direction the enemy is currently walking in.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Computes the position reached after one step of `speed` world units.
    ///
    /// Returns `None` when no direction is known, which leaves the enemy
    /// stranded.
    pub fn advance(
        &mut self,
        grid: &dyn PathGrid,
        position: Position,
        speed: u32,
    ) -> Option<Position> {
        if self.steps_done == 0 {
            self.direction = grid.direction_at(position);
        }
        let direction = self.direction?;

        self.steps_done = self.steps_done.saturating_add(speed);
        if self.steps_done >= self.tile_size {
            self.steps_done = 0;
        }

        Some(position.translated(direction, f64::from(speed)))
    }
}

/// Control loop owning a single enemy.
pub struct EnemyAgent {
    enemy: EnemyHandle,
    grid: Arc<dyn PathGrid>,
    roster: Roster,
    stats: Arc<dyn StatsSink>,
    config: EnemyAgentConfig,
    follower: PathFollower,
}

impl std::fmt::Debug for EnemyAgent {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("EnemyAgent")
            .field("enemy", &self.enemy.id())
            .field("config", &self.config)
            .field("follower", &self.follower)
            .finish_non_exhaustive()
    }
}

impl EnemyAgent {
    /// Creates an agent for an enemy that already joined `roster`.
    #[must_use]
    pub fn new(
        enemy: EnemyHandle,
        grid: Arc<dyn PathGrid>,
        roster: Roster,
        stats: Arc<dyn StatsSink>,
        config: EnemyAgentConfig,
    ) -> Self {
        let follower = PathFollower::new(grid.tile_size());
        Self {
            enemy,
            grid,
            roster,
            stats,
            config,
            follower,
        }
    }

    /// Live state of the controlled enemy.
    #[must_use]
    pub fn enemy(&self) -> &EnemyHandle {
        &self.enemy
    }

    /// Runs one iteration of the control loop.
    pub fn tick(&mut self) -> ControlFlow<EnemyOutcome> {
        if !self.enemy.is_alive() {
            self.report_kill();
            return ControlFlow::Break(EnemyOutcome::Killed);
        }

        let speed = self.enemy.speed();
        let Some(next) = self
            .follower
            .advance(self.grid.as_ref(), self.enemy.position(), speed)
        else {
            let position = self.enemy.position();
            error!(
                enemy = self.enemy.id().get(),
                x = position.x(),
                y = position.y(),
                "enemy has no direction to move in"
            );
            let _ = self.roster.remove(self.enemy.id());
            return ControlFlow::Break(EnemyOutcome::Faulted);
        };
        self.enemy.record_step(next, speed);

        if self.grid.is_out_of_bounds(next) {
            self.report_leak();
            return ControlFlow::Break(EnemyOutcome::Leaked);
        }

        ControlFlow::Continue(())
    }

    /// Spawns the control loop on the current tokio runtime.
    pub fn start(mut self) -> AgentHandle<EnemyOutcome> {
        let signal = Arc::new(StopSignal::new());
        let agent_signal = Arc::clone(&signal);
        AgentHandle::spawn(signal, async move {
            let id = self.enemy.id().get();
            let period = self.config.tick;
            info!(enemy = id, kind = ?self.enemy.kind(), "enemy agent started");
            let outcome = match run_ticks(&agent_signal, period, || self.tick()).await {
                Some(outcome) => outcome,
                None => {
                    let _ = self.roster.remove(self.enemy.id());
                    EnemyOutcome::Stopped
                }
            };
            info!(enemy = id, ?outcome, "enemy agent finished");
            outcome
        })
    }

    fn report_kill(&self) {
        if !self.roster.remove(self.enemy.id()) {
            return;
        }
        let reward = self.enemy.reward();
        self.stats.apply_money(reward);
        self.stats.apply_score(reward);
        info!(enemy = self.enemy.id().get(), reward, "enemy killed");
    }

    fn report_leak(&self) {
        if !self.roster.remove(self.enemy.id()) {
            return;
        }
        self.stats
            .apply_health(self.config.leak_health_penalty.saturating_neg());
        self.stats.apply_score(self.enemy.reward().saturating_neg());
        info!(enemy = self.enemy.id().get(), "enemy leaked");
    }
}
