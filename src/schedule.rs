//! Cancellable background tasks.
//!
//! The poller's timer and the channel-list cleanup both run as detached tokio
//! tasks. Each is tied to a [`TaskHandle`]; cancelling the handle stops the
//! task at its next await point. Cancellation is one-way and idempotent.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Handle to a spawned background task.
#[derive(Clone, Debug, Default)]
pub struct TaskHandle {
    token: CancellationToken,
}

impl TaskHandle {
    /// A handle with nothing attached yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the task. Safe to call any number of times.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Run `tick` after `initial_delay`, then every `period`.
///
/// Missed ticks are skipped rather than bursted. `tick` must not block.
/// A zero period is raised to one millisecond.
pub fn spawn_repeating<F>(initial_delay: Duration, period: Duration, mut tick: F) -> TaskHandle
where
    F: FnMut() + Send + 'static,
{
    let handle = TaskHandle::new();
    let token = handle.token.clone();
    let period = period.max(Duration::from_millis(1));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + initial_delay, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = interval.tick() => tick(),
            }
        }
    });

    handle
}

/// Run `task` once after `delay` unless cancelled first.
pub fn spawn_delayed<F>(delay: Duration, task: F) -> TaskHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = TaskHandle::new();
    let token = handle.token.clone();

    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(delay) => task.await,
        }
    });

    handle
}
