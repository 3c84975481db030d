#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Owner of a running simulation.
//!
//! The [`Director`] wires the shared world state to the agents: it spawns an
//! enemy agent per enemy, a turret agent per placed turret, collects the
//! outcomes of finished agents and shuts everything down on request. It must
//! be driven from within a tokio runtime.

mod combat;
mod config;

use std::{collections::BTreeMap, sync::Arc};

use path_defence_core::{
    BulletSink, Enemy, EnemyHandle, EnemyId, PathGrid, StatsSink, Turret, TurretHandle,
    TurretId, TurretSnapshot,
};
use path_defence_enemy_agent::{EnemyAgent, EnemyAgentConfig, EnemyOutcome};
use path_defence_runtime::{AgentError, AgentHandle};
use path_defence_turret_agent::{TurretAgent, TurretAgentConfig, TurretOutcome};
use path_defence_waves::Wave;
use path_defence_world::{
    PlayerStats, PlayerTotals, Roster, RosterCounters, TileMap, TurretRegistry,
};
use tracing::{info, warn};

pub use combat::HitscanCombat;
pub use config::{
    ConfigError, MapConfig, PlayerConfig, RulesConfig, SimulationConfig, TimingConfig,
    TurretPlacement, DEFAULT_LAYOUT,
};

/// Outcomes collected while shutting a simulation down.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Outcome of every enemy agent that was still tracked.
    pub enemies: Vec<(EnemyId, EnemyOutcome)>,
    /// Number of turret agents that were stopped.
    pub turrets: usize,
}

/// Running simulation: shared world state plus the agents acting on it.
#[derive(Debug)]
pub struct Director {
    map: Arc<TileMap>,
    roster: Roster,
    stats: Arc<PlayerStats>,
    combat: Arc<HitscanCombat>,
    enemy_config: EnemyAgentConfig,
    turret_config: TurretAgentConfig,
    enemy_agents: BTreeMap<EnemyId, AgentHandle<EnemyOutcome>>,
    turrets: TurretRegistry,
    turret_agents: BTreeMap<TurretId, AgentHandle<TurretOutcome>>,
}

impl Director {
    /// Creates an empty simulation on `map`.
    #[must_use]
    pub fn new(
        map: TileMap,
        initial: PlayerTotals,
        enemy_config: EnemyAgentConfig,
        turret_config: TurretAgentConfig,
    ) -> Self {
        let roster = Roster::new();
        Self {
            map: Arc::new(map),
            combat: Arc::new(HitscanCombat::new()),
            roster,
            stats: Arc::new(PlayerStats::new(initial)),
            enemy_config,
            turret_config,
            enemy_agents: BTreeMap::new(),
            turrets: TurretRegistry::new(),
            turret_agents: BTreeMap::new(),
        }
    }

    /// Validates `config`, builds its map and places its turrets.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut director = Self::new(
            config.tile_map()?,
            config.player_totals(),
            config.enemy_agent_config(),
            config.turret_agent_config(),
        );
        for placement in &config.turrets {
            let _ = director.place_turret(placement.turret(config.map.tile_size));
        }
        Ok(director)
    }

    /// Map the enemies walk on.
    #[must_use]
    pub fn map(&self) -> &TileMap {
        &self.map
    }

    /// Roster shared with every agent.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Combat collaborator receiving every bullet.
    #[must_use]
    pub fn combat(&self) -> &HitscanCombat {
        &self.combat
    }

    /// Registers `enemy` and starts its agent.
    pub fn spawn_enemy(&mut self, enemy: &Enemy) -> EnemyHandle {
        let handle = self.roster.insert(enemy);
        let agent = EnemyAgent::new(
            handle.clone(),
            Arc::clone(&self.map) as Arc<dyn PathGrid>,
            self.roster.clone(),
            Arc::clone(&self.stats) as Arc<dyn StatsSink>,
            self.enemy_config,
        );
        let _ = self.enemy_agents.insert(handle.id(), agent.start());
        handle
    }

    /// Releases every enemy of `wave` at once.
    pub fn spawn_wave(&mut self, wave: &Wave) -> Vec<EnemyHandle> {
        let spawned: Vec<_> = wave
            .enemies()
            .iter()
            .map(|enemy| self.spawn_enemy(enemy))
            .collect();
        info!(enemies = spawned.len(), "wave spawned");
        spawned
    }

    /// Places `turret` and starts its agent.
    pub fn place_turret(&mut self, turret: Turret) -> TurretHandle {
        let handle = self.turrets.place(turret);
        let agent = TurretAgent::new(
            handle.clone(),
            self.roster.clone(),
            Arc::clone(&self.combat) as Arc<dyn BulletSink>,
            self.turret_config,
        );
        let _ = self.turret_agents.insert(handle.id(), agent.start());
        handle
    }

    /// Removes a turret and waits for its agent to stop.
    ///
    /// Returns `None` when no turret with `id` is placed.
    pub async fn stop_turret(
        &mut self,
        id: TurretId,
    ) -> Result<Option<TurretOutcome>, AgentError> {
        let _ = self.turrets.remove(id);
        let Some(agent) = self.turret_agents.remove(&id) else {
            return Ok(None);
        };
        agent.stop();
        agent.join().await.map(Some)
    }

    /// Collects the outcomes of enemy agents that finished on their own.
    pub async fn reap(&mut self) -> Result<Vec<(EnemyId, EnemyOutcome)>, AgentError> {
        let finished: Vec<EnemyId> = self
            .enemy_agents
            .iter()
            .filter(|(_, agent)| agent.is_finished())
            .map(|(id, _)| *id)
            .collect();

        let mut outcomes = Vec::with_capacity(finished.len());
        for id in finished {
            if let Some(agent) = self.enemy_agents.remove(&id) {
                outcomes.push((id, agent.join().await?));
            }
        }
        Ok(outcomes)
    }

    /// Number of enemy agents not yet reaped.
    #[must_use]
    pub fn tracked_enemies(&self) -> usize {
        self.enemy_agents.len()
    }

    /// Live enemies in spawn order.
    #[must_use]
    pub fn live_enemies(&self) -> Vec<EnemyHandle> {
        self.roster.snapshot()
    }

    /// Placed turrets in placement order.
    #[must_use]
    pub fn turrets(&self) -> Vec<TurretSnapshot> {
        self.turrets.snapshots()
    }

    /// Current player statistics.
    #[must_use]
    pub fn stats(&self) -> PlayerTotals {
        self.stats.snapshot()
    }

    /// Reports whether the player ran out of health.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.stats.is_defeated()
    }

    /// Lifetime roster bookkeeping.
    #[must_use]
    pub fn counters(&self) -> RosterCounters {
        self.roster.counters()
    }

    /// Stops every agent and waits for all of them.
    ///
    /// Every agent is awaited even when one fails; the first failure is
    /// returned. Calling `shutdown` again yields an empty report.
    pub async fn shutdown(&mut self) -> Result<ShutdownReport, AgentError> {
        for agent in self.enemy_agents.values() {
            agent.stop();
        }
        for agent in self.turret_agents.values() {
            agent.stop();
        }

        let mut report = ShutdownReport::default();
        let mut failure = None;
        for (id, agent) in std::mem::take(&mut self.enemy_agents) {
            match agent.join().await {
                Ok(outcome) => report.enemies.push((id, outcome)),
                Err(error) => {
                    warn!(enemy = id.get(), %error, "enemy agent failed");
                    let _ = failure.get_or_insert(error);
                }
            }
        }
        for (id, agent) in std::mem::take(&mut self.turret_agents) {
            match agent.join().await {
                Ok(TurretOutcome::Stopped) => report.turrets += 1,
                Err(error) => {
                    warn!(turret = id.get(), %error, "turret agent failed");
                    let _ = failure.get_or_insert(error);
                }
            }
        }
        let _ = self.turrets.drain();

        match failure {
            Some(error) => Err(error),
            None => {
                info!(
                    enemies = report.enemies.len(),
                    turrets = report.turrets,
                    "simulation shut down"
                );
                Ok(report)
            }
        }
    }
}

impl Drop for Director {
    fn drop(&mut self) {
        for agent in self.enemy_agents.values() {
            agent.stop();
        }
        for agent in self.turret_agents.values() {
            agent.stop();
        }
    }
}
