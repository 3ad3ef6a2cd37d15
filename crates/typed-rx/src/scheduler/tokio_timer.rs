//! Scheduler backed by tokio timers

use std::time::Duration;

use tokio::time::Instant;

use super::{Scheduler, Task};
use crate::subscription::Subscription;

/// Scheduler running tasks on the current tokio `LocalSet`
///
/// Tasks are not `Send`, so they are spawned with
/// [`tokio::task::spawn_local`]. Canceling aborts the spawned timer task.
#[derive(Debug, Clone, Copy)]
pub struct TokioScheduler {
    origin: Instant,
}

impl TokioScheduler {
    /// Create a scheduler whose clock starts now
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    /// # Panics
    ///
    /// Panics if called outside a tokio `LocalSet`.
    fn schedule(&self, delay: Duration, task: Task) -> Subscription {
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            task();
        });

        let subscription = Subscription::new();
        subscription.add(move || handle.abort());
        subscription
    }
}
