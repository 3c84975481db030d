use std::{sync::Arc, time::Duration};

use path_defence_core::{Bullet, BulletSink, TurretHandle};
use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Timer task that emits bullets while its turret holds a live target.
///
/// The first pulse fires one period after [`FiringCadence::start`]. The task
/// is aborted by [`FiringCadence::stop`] and when the cadence is dropped.
#[derive(Debug, Default)]
pub struct FiringCadence {
    task: Option<JoinHandle<()>>,
}

impl FiringCadence {
    /// Creates an idle cadence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether the timer task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Starts pulsing every `period` unless the cadence already runs.
    pub fn start(
        &mut self,
        turret: &TurretHandle,
        bullets: Arc<dyn BulletSink>,
        period: Duration,
    ) {
        if self.is_running() {
            return;
        }

        let pulsing = turret.clone();
        self.task = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                let _ = ticker.tick().await;
                pulse(&pulsing, bullets.as_ref());
            }
        }));
        turret.set_firing(true);
        debug!(turret = turret.id().get(), ?period, "firing cadence started");
    }

    /// Stops the timer task if it runs.
    pub fn stop(&mut self, turret: &TurretHandle) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(turret = turret.id().get(), "firing cadence stopped");
        }
        turret.set_firing(false);
    }
}

impl Drop for FiringCadence {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn pulse(turret: &TurretHandle, bullets: &dyn BulletSink) {
    let Some(target) = turret.live_target() else {
        return;
    };
    let params = turret.turret();
    bullets.bullet_created(Bullet {
        turret: turret.id(),
        target: target.downgrade(),
        origin: params.position,
        angle: turret.angle(),
        damage: params.damage,
    });
}
