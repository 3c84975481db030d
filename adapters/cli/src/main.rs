#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Path Defence simulation.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use path_defence_director::{Director, HitscanCombat, SimulationConfig};
use path_defence_waves::load_waves;
use path_defence_world::{PlayerTotals, RosterCounters};
use tokio::time::{self, Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Interval at which the run loop releases waves and collects outcomes.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Command-line options accepted by the simulation runner.
#[derive(Debug, Parser)]
#[command(name = "path-defence", about = "Runs a headless Path Defence simulation")]
struct Cli {
    /// TOML configuration; built-in defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Wave definition file, one wave per line.
    #[arg(long, value_name = "PATH")]
    waves: PathBuf,

    /// Wall-clock limit of the run in seconds.
    #[arg(long, default_value_t = 10)]
    duration_secs: u64,

    /// Delay between two consecutive waves in milliseconds.
    #[arg(long, default_value_t = 2_000)]
    wave_gap_ms: u64,
}

/// Final state of a run.
#[derive(Debug)]
struct Summary {
    waves_released: usize,
    totals: PlayerTotals,
    counters: RosterCounters,
    bullets_fired: u64,
    bullets_hit: u64,
}

impl Summary {
    fn new(waves_released: usize, director: &Director) -> Self {
        let combat: &HitscanCombat = director.combat();
        Self {
            waves_released,
            totals: director.stats(),
            counters: director.counters(),
            bullets_fired: combat.fired(),
            bullets_hit: combat.hits(),
        }
    }

    fn render(&self) -> String {
        format!(
            "waves released: {}\n\
             enemies: {} spawned, {} removed, {} remaining\n\
             bullets: {} fired, {} hit\n\
             player: health {}, money {}, score {}",
            self.waves_released,
            self.counters.spawned,
            self.counters.removed,
            self.counters.live(),
            self.bullets_fired,
            self.bullets_hit,
            self.totals.health,
            self.totals.money,
            self.totals.score,
        )
    }
}

/// Entry point for the Path Defence command-line interface.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let summary = run(&cli).await?;
    println!("{}", summary.render());
    Ok(())
}

async fn run(cli: &Cli) -> Result<Summary> {
    let config = match &cli.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    let mut director =
        Director::from_config(&config).context("failed to set up the simulation")?;
    let waves = load_waves(
        &cli.waves,
        director.map().start_position(),
        &config.archetypes,
    )
    .with_context(|| format!("failed to load waves from {}", cli.waves.display()))?;
    info!(
        waves = waves.len(),
        turrets = director.turrets().len(),
        duration_secs = cli.duration_secs,
        "simulation starting"
    );

    let started = Instant::now();
    let deadline = started + Duration::from_secs(cli.duration_secs);
    let wave_gap = Duration::from_millis(cli.wave_gap_ms);
    let mut pending = waves.iter();
    let mut released = 0_usize;
    let mut next_wave = started;

    loop {
        let now = Instant::now();
        if now >= deadline {
            info!("time limit reached");
            break;
        }
        if director.is_defeated() {
            info!("player defeated");
            break;
        }

        if now >= next_wave {
            if let Some(wave) = pending.next() {
                let _ = director.spawn_wave(wave);
                released += 1;
                next_wave = now + wave_gap;
            }
        }

        for (enemy, outcome) in director.reap().await? {
            debug!(enemy = enemy.get(), ?outcome, "enemy resolved");
        }
        if pending.len() == 0 && director.tracked_enemies() == 0 {
            info!("all waves resolved");
            break;
        }

        time::sleep(POLL_INTERVAL).await;
    }

    let report = director
        .shutdown()
        .await
        .context("failed to stop the simulation")?;
    info!(
        stopped_enemies = report.enemies.len(),
        stopped_turrets = report.turrets,
        "simulation finished"
    );
    Ok(Summary::new(released, &director))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn demo(file: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../demos")
            .join(file)
    }

    #[test]
    fn flags_fall_back_to_defaults() {
        let cli = Cli::try_parse_from(["path-defence", "--waves", "waves.txt"])
            .expect("arguments parse");
        assert_eq!(cli.waves, PathBuf::from("waves.txt"));
        assert!(cli.config.is_none());
        assert_eq!(cli.duration_secs, 10);
        assert_eq!(cli.wave_gap_ms, 2_000);
    }

    #[test]
    fn wave_file_is_required() {
        assert!(Cli::try_parse_from(["path-defence"]).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn demo_run_accounts_for_every_enemy() {
        let cli = Cli {
            config: Some(demo("config.toml")),
            waves: demo("waves.txt"),
            duration_secs: 60,
            wave_gap_ms: 500,
        };

        let summary = run(&cli).await.expect("demo run succeeds");

        assert_eq!(summary.waves_released, 4);
        assert_eq!(summary.counters.spawned, 17);
        assert_eq!(summary.counters.live(), 0);
        assert!(summary.bullets_fired >= summary.bullets_hit);
        assert!(summary.render().contains("17 spawned"));
    }

    #[tokio::test]
    async fn unknown_wave_code_aborts_the_run() {
        let waves = std::env::temp_dir()
            .join(format!("path-defence-cli-{}.txt", std::process::id()));
        std::fs::write(&waves, "1 2\n7\n").expect("wave file is written");
        let cli = Cli {
            config: None,
            waves: waves.clone(),
            duration_secs: 1,
            wave_gap_ms: 10,
        };

        let error = run(&cli).await.expect_err("run is rejected");
        std::fs::remove_file(&waves).expect("wave file is removed");
        assert!(format!("{error:#}").contains("unknown enemy code '7'"));
    }
}
