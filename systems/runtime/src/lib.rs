#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared lifecycle plumbing for the autonomous enemy and turret agents.
//!
//! Every agent runs as its own tokio task driven by a fixed-period ticker.
//! [`StopSignal`] delivers cooperative cancellation, [`run_ticks`] drives
//! the tick loop and [`AgentHandle`] lets the owner stop and await a task.

use std::{
    future::Future,
    ops::ControlFlow,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{
    sync::Notify,
    task::{JoinError, JoinHandle},
    time::{self, Interval, MissedTickBehavior},
};
use tracing::{debug, warn};

/// Shortest tick period an agent can be driven with.
pub const MIN_TICK: Duration = Duration::from_millis(1);

/// Errors surfaced when awaiting an agent task.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The task panicked or was cancelled before producing its outcome.
    #[error("agent task did not complete: {source}")]
    Join {
        /// Error reported by the tokio runtime.
        #[from]
        source: JoinError,
    },
}

/// Cooperative cancellation flag shared between an agent and its owner.
#[derive(Debug, Default)]
pub struct StopSignal {
    stopped: AtomicBool,
    notify: Notify,
}

impl StopSignal {
    /// Creates a signal in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the agent to stop and wakes it if it is sleeping.
    ///
    /// Calling `stop` more than once has no further effect.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::AcqRel) {
            debug!("agent stop requested");
            self.notify.notify_waiters();
        }
    }

    /// Reports whether a stop was requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Resolves once a stop was requested.
    pub async fn stopped(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_stopped() {
                return;
            }
            notified.await;
        }
    }
}

/// Owner-side handle of a spawned agent task.
#[derive(Debug)]
pub struct AgentHandle<T> {
    signal: Arc<StopSignal>,
    join: JoinHandle<T>,
}

impl<T> AgentHandle<T>
where
    T: Send + 'static,
{
    /// Spawns `agent` on the current tokio runtime.
    ///
    /// `signal` must be the same signal the agent future observes.
    pub fn spawn<F>(signal: Arc<StopSignal>, agent: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            signal,
            join: tokio::spawn(agent),
        }
    }

    /// Requests the agent to stop at its next wake-up.
    pub fn stop(&self) {
        self.signal.stop();
    }

    /// Signal shared with the running agent.
    #[must_use]
    pub fn signal(&self) -> &Arc<StopSignal> {
        &self.signal
    }

    /// Reports whether the agent task has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the agent task and returns its outcome.
    pub async fn join(self) -> Result<T, AgentError> {
        self.join.await.map_err(|error| {
            warn!(panicked = error.is_panic(), "agent task did not complete");
            AgentError::from(error)
        })
    }
}

/// Creates a ticker whose first tick completes immediately.
///
/// Missed ticks are delivered in a burst rather than skipped, so a delayed
/// agent catches up on the movement it owes.
#[must_use]
pub fn tick_interval(period: Duration) -> Interval {
    let mut ticker = time::interval(period.max(MIN_TICK));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
    ticker
}

/// Invokes `tick` once per `period` until it breaks or `signal` is raised.
///
/// Returns the value `tick` broke with, or `None` when the loop ended
/// because of a stop request. No tick runs once a stop was observed.
pub async fn run_ticks<T>(
    signal: &StopSignal,
    period: Duration,
    mut tick: impl FnMut() -> ControlFlow<T>,
) -> Option<T> {
    let mut ticker = tick_interval(period);
    loop {
        tokio::select! {
            biased;
            () = signal.stopped() => return None,
            _ = ticker.tick() => {}
        }

        if signal.is_stopped() {
            return None;
        }
        if let ControlFlow::Break(outcome) = tick() {
            return Some(outcome);
        }
    }
}
