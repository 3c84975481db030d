#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autonomous control loop that aims a turret and drives its firing cadence.
//!
//! A turret searches the roster for the most advanced enemy in range, tracks
//! it while it stays alive and in range, and keeps a separate firing cadence
//! running only while a target is locked.

mod cadence;
mod selection;

use std::{ops::ControlFlow, sync::Arc, time::Duration};

use path_defence_core::{BulletSink, EnemyHandle, TurretHandle, DEFAULT_TURRET_TICK};
use path_defence_runtime::{run_ticks, AgentHandle, StopSignal, MIN_TICK};
use path_defence_world::Roster;
use tracing::{debug, info};

pub use cadence::FiringCadence;
pub use selection::select_target;

/// Tunables for turret agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurretAgentConfig {
    /// Interval between two ticks.
    pub tick: Duration,
}

impl Default for TurretAgentConfig {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TURRET_TICK,
        }
    }
}

/// How a turret agent ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurretOutcome {
    /// The owner stopped the agent.
    Stopped,
}

/// Control loop owning a single placed turret.
pub struct TurretAgent {
    turret: TurretHandle,
    roster: Roster,
    bullets: Arc<dyn BulletSink>,
    config: TurretAgentConfig,
    cadence: FiringCadence,
}

impl std::fmt::Debug for TurretAgent {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TurretAgent")
            .field("turret", &self.turret.id())
            .field("config", &self.config)
            .field("cadence", &self.cadence)
            .finish_non_exhaustive()
    }
}

impl TurretAgent {
    /// Creates an agent for `turret` that scans `roster` for targets.
    #[must_use]
    pub fn new(
        turret: TurretHandle,
        roster: Roster,
        bullets: Arc<dyn BulletSink>,
        config: TurretAgentConfig,
    ) -> Self {
        Self {
            turret,
            roster,
            bullets,
            config,
            cadence: FiringCadence::new(),
        }
    }

    /// Live state of the controlled turret.
    #[must_use]
    pub fn turret(&self) -> &TurretHandle {
        &self.turret
    }

    /// Reports whether the firing cadence is running.
    #[must_use]
    pub fn is_firing(&self) -> bool {
        self.cadence.is_running()
    }

    /// Runs one iteration of the control loop.
    ///
    /// Must be called from within a tokio runtime, since locking a target
    /// spawns the firing cadence.
    pub fn tick(&mut self) {
        let Some(target) = self.turret.live_target() else {
            self.cadence.stop(&self.turret);
            self.acquire();
            return;
        };

        let params = *self.turret.turret();
        let position = target.position();
        if params.position.distance_to(position) <= params.range {
            self.turret.set_angle(params.position.bearing_to(position));
            if let Some(period) = params.fire_period() {
                self.cadence
                    .start(&self.turret, Arc::clone(&self.bullets), period.max(MIN_TICK));
            }
        } else {
            self.turret.set_target(None);
            self.cadence.stop(&self.turret);
            debug!(
                turret = self.turret.id().get(),
                enemy = target.id().get(),
                "target left range"
            );
        }
    }

    /// Spawns the control loop on the current tokio runtime.
    pub fn start(mut self) -> AgentHandle<TurretOutcome> {
        let signal = Arc::new(StopSignal::new());
        let agent_signal = Arc::clone(&signal);
        AgentHandle::spawn(signal, async move {
            let id = self.turret.id().get();
            let period = self.config.tick;
            info!(turret = id, "turret agent started");
            let _ = run_ticks(&agent_signal, period, || {
                self.tick();
                ControlFlow::<()>::Continue(())
            })
            .await;
            self.cadence.stop(&self.turret);
            self.turret.set_target(None);
            info!(turret = id, "turret agent stopped");
            TurretOutcome::Stopped
        })
    }

    fn acquire(&mut self) {
        let params = *self.turret.turret();
        let target = self.roster.scan(|view| {
            select_target(params.position, params.range, view.iter()).map(EnemyHandle::downgrade)
        });

        let previous = self.turret.target().map(|held| held.id());
        let next = target.as_ref().map(|held| held.id());
        if previous != next {
            debug!(
                turret = self.turret.id().get(),
                previous = ?previous,
                next = ?next,
                "target changed"
            );
        }
        self.turret.set_target(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::{Bullet, Enemy, EnemyKind, Position, Turret, TurretId};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        bullets: Mutex<Vec<Bullet>>,
    }

    impl BulletSink for Recorder {
        fn bullet_created(&self, bullet: Bullet) {
            self.bullets.lock().push(bullet);
        }
    }

    fn enemy_at(x: f64, y: f64) -> Enemy {
        Enemy {
            kind: EnemyKind::Light,
            position: Position::new(x, y),
            health: 80,
            speed: 4,
            reward: 10,
        }
    }

    fn agent(roster: &Roster) -> TurretAgent {
        let turret = TurretHandle::new(
            TurretId::new(0),
            Turret {
                position: Position::new(100.0, 100.0),
                range: 50.0,
                fire_rate: 4.0,
                damage: 10,
            },
        );
        TurretAgent::new(
            turret,
            roster.clone(),
            Arc::new(Recorder::default()),
            TurretAgentConfig::default(),
        )
    }

    #[tokio::test]
    async fn empty_roster_leaves_turret_idle() {
        let roster = Roster::new();
        let mut agent = agent(&roster);
        agent.tick();
        agent.tick();
        assert!(agent.turret().target().is_none());
        assert!(!agent.is_firing());
        assert!(!agent.turret().is_firing());
    }

    #[tokio::test]
    async fn locks_then_aims_and_fires() {
        let roster = Roster::new();
        let enemy = roster.insert(&enemy_at(100.0, 130.0));
        let mut agent = agent(&roster);

        agent.tick();
        assert_eq!(
            agent.turret().target().map(|held| held.id()),
            Some(enemy.id())
        );
        assert!(!agent.is_firing(), "acquisition tick does not fire yet");

        agent.tick();
        assert!(agent.is_firing());
        assert!(agent.turret().snapshot().firing);
        assert!((agent.turret().angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[tokio::test]
    async fn removed_target_stops_cadence_within_one_tick() {
        let roster = Roster::new();
        let enemy = roster.insert(&enemy_at(120.0, 100.0));
        let mut agent = agent(&roster);
        agent.tick();
        agent.tick();
        assert!(agent.is_firing());

        assert!(roster.remove(enemy.id()));
        agent.tick();
        assert!(!agent.is_firing());
        assert!(agent.turret().target().is_none());
    }

    #[tokio::test]
    async fn target_leaving_range_is_dropped_immediately() {
        let roster = Roster::new();
        let enemy = roster.insert(&enemy_at(120.0, 100.0));
        let mut agent = agent(&roster);
        agent.tick();
        agent.tick();

        enemy.record_step(Position::new(200.0, 100.0), 80);
        agent.tick();
        assert!(agent.turret().target().is_none());
        assert!(!agent.is_firing());
    }

    #[tokio::test]
    async fn reacquires_the_leader_after_losing_a_target() {
        let roster = Roster::new();
        let leader = roster.insert(&enemy_at(110.0, 100.0));
        let follower = roster.insert(&enemy_at(90.0, 100.0));
        leader.record_step(Position::new(110.0, 100.0), 60);
        follower.record_step(Position::new(90.0, 100.0), 20);
        let mut agent = agent(&roster);

        agent.tick();
        assert_eq!(
            agent.turret().target().map(|held| held.id()),
            Some(leader.id())
        );

        let _ = leader.apply_damage(500);
        agent.tick();
        assert_eq!(
            agent.turret().target().map(|held| held.id()),
            Some(follower.id())
        );
    }
}
