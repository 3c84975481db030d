use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use path_defence_core::{EnemyFactory, EnemyId, EnemyKind, Position, Turret};
use path_defence_director::{Director, SimulationConfig};
use path_defence_enemy_agent::{EnemyAgentConfig, EnemyOutcome};
use path_defence_turret_agent::TurretAgentConfig;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const ENEMIES: usize = 48;
const TURRETS: usize = 8;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn agents_keep_roster_and_stats_consistent() {
    let config = SimulationConfig::default();
    let map = config.tile_map().expect("default map parses");
    let initial = config.player_totals();
    let mut rng = ChaCha8Rng::seed_from_u64(0x7d_2024);
    let mut director = Director::new(
        map,
        initial,
        EnemyAgentConfig {
            tick: Duration::from_millis(1),
            leak_health_penalty: 1,
        },
        TurretAgentConfig {
            tick: Duration::from_millis(2),
        },
    );

    let width = director.map().width();
    let height = director.map().height();
    for _ in 0..TURRETS {
        let _ = director.place_turret(Turret {
            position: Position::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height)),
            range: rng.gen_range(60.0..140.0),
            fire_rate: rng.gen_range(20.0..80.0),
            damage: rng.gen_range(20..60),
        });
    }

    let start = director.map().start_position();
    let mut rewards = BTreeMap::new();
    for _ in 0..ENEMIES {
        let kind = EnemyKind::ALL[rng.gen_range(0..EnemyKind::ALL.len())];
        let handle = director.spawn_enemy(&config.archetypes.create(kind, start));
        let _ = rewards.insert(handle.id(), handle.reward());
        tokio::time::sleep(Duration::from_millis(rng.gen_range(0..4))).await;
    }

    for _ in 0..20 {
        let removed: BTreeSet<EnemyId> = rewards
            .keys()
            .copied()
            .filter(|id| !director.roster().contains(*id))
            .collect();
        tokio::time::sleep(Duration::from_millis(40)).await;

        for turret in director.turrets() {
            if let Some(target) = turret.target {
                assert!(
                    !removed.contains(&target),
                    "turret {:?} still targets removed enemy {target:?}",
                    turret.id
                );
            }
        }
        let counters = director.counters();
        assert!(counters.removed <= counters.spawned);
        assert!(director.live_enemies().len() <= ENEMIES);
    }

    let report = director.shutdown().await.expect("agents join");
    assert_eq!(report.turrets, TURRETS);
    assert_eq!(report.enemies.len(), ENEMIES);

    let mut killed = 0_i64;
    let mut leaked = 0_i64;
    let mut penalty = 0_i64;
    for (id, outcome) in &report.enemies {
        let reward = rewards[id];
        match outcome {
            EnemyOutcome::Killed => killed += reward,
            EnemyOutcome::Leaked => {
                leaked += reward;
                penalty += 1;
            }
            EnemyOutcome::Stopped => {}
            EnemyOutcome::Faulted => panic!("enemy {id:?} left the path"),
        }
    }

    let counters = director.counters();
    assert_eq!(counters.spawned, ENEMIES as u64);
    assert_eq!(counters.removed, ENEMIES as u64);
    assert_eq!(counters.live(), 0);
    assert!(director.live_enemies().is_empty());

    let stats = director.stats();
    assert_eq!(stats.money, initial.money + killed);
    assert_eq!(stats.score, initial.score + killed - leaked);
    assert_eq!(stats.health, initial.health - penalty);
}
