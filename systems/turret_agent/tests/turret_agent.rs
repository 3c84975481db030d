use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use path_defence_core::{
    Bullet, BulletSink, Enemy, EnemyKind, Position, Turret, TurretHandle, TurretId,
};
use path_defence_turret_agent::{TurretAgent, TurretAgentConfig, TurretOutcome};
use path_defence_world::Roster;

#[derive(Default)]
struct Recorder {
    bullets: Mutex<Vec<Bullet>>,
}

impl Recorder {
    fn count(&self) -> usize {
        self.bullets.lock().len()
    }
}

impl BulletSink for Recorder {
    fn bullet_created(&self, bullet: Bullet) {
        self.bullets.lock().push(bullet);
    }
}

fn turret(fire_rate: f64) -> TurretHandle {
    TurretHandle::new(
        TurretId::new(3),
        Turret {
            position: Position::new(0.0, 0.0),
            range: 100.0,
            fire_rate,
            damage: 25,
        },
    )
}

fn enemy() -> Enemy {
    Enemy {
        kind: EnemyKind::Heavy,
        position: Position::new(30.0, 40.0),
        health: 300,
        speed: 1,
        reward: 30,
    }
}

#[tokio::test(start_paused = true)]
async fn cadence_fires_only_while_a_target_is_held() {
    let roster = Roster::new();
    let recorder = Arc::new(Recorder::default());
    let handle = turret(10.0);
    let agent = TurretAgent::new(
        handle.clone(),
        roster.clone(),
        Arc::clone(&recorder) as Arc<dyn BulletSink>,
        TurretAgentConfig::default(),
    )
    .start();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(recorder.count(), 0, "nothing to shoot at");
    assert!(!handle.is_firing());

    let target = roster.insert(&enemy());
    tokio::time::sleep(Duration::from_millis(1_050)).await;
    let fired = recorder.count();
    assert!((9..=10).contains(&fired), "fired {fired} bullets");
    assert!(handle.is_firing());

    {
        let bullets = recorder.bullets.lock();
        let first = bullets.first().expect("at least one bullet");
        assert_eq!(first.turret, TurretId::new(3));
        assert_eq!(first.target.id(), target.id());
        assert_eq!(first.damage, 25);
        assert!((first.angle - 40.0_f64.atan2(30.0)).abs() < 1e-12);
    }

    assert!(roster.remove(target.id()));
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(!handle.is_firing());
    assert!(handle.target().is_none());
    let after_removal = recorder.count();

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(recorder.count(), after_removal);

    agent.stop();
    assert_eq!(
        agent.join().await.expect("agent joins"),
        TurretOutcome::Stopped
    );
}

#[tokio::test(start_paused = true)]
async fn stopping_the_turret_stops_its_cadence() {
    let roster = Roster::new();
    let _target = roster.insert(&enemy());
    let recorder = Arc::new(Recorder::default());
    let handle = turret(5.0);
    let agent = TurretAgent::new(
        handle.clone(),
        roster.clone(),
        Arc::clone(&recorder) as Arc<dyn BulletSink>,
        TurretAgentConfig::default(),
    )
    .start();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(handle.is_firing());

    agent.stop();
    let _ = agent.join().await.expect("agent joins");
    let fired = recorder.count();
    assert!(!handle.is_firing());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(recorder.count(), fired);
}
