//! Timing sources for timed operators
//!
//! Timed operators never block. They ask a [`Scheduler`] to run a task after a
//! delay and keep the returned [`Subscription`] to cancel it.
//!
//! Implementations:
//! - [`VirtualTimeScheduler`]: deterministic clock advanced by hand
//! - [`TokioScheduler`]: tokio timers on a `LocalSet` (feature `tokio`)

mod virtual_time;

#[cfg(feature = "tokio")]
mod tokio_timer;

use std::time::Duration;

use crate::subscription::Subscription;

pub use virtual_time::VirtualTimeScheduler;

#[cfg(feature = "tokio")]
pub use tokio_timer::TokioScheduler;

/// A deferred unit of work
pub type Task = Box<dyn FnOnce()>;

/// External timing source
pub trait Scheduler {
    /// Time elapsed since the scheduler's origin
    fn now(&self) -> Duration;

    /// Run `task` once after `delay`.
    ///
    /// Unsubscribing the returned subscription before the task runs cancels it.
    fn schedule(&self, delay: Duration, task: Task) -> Subscription;
}
