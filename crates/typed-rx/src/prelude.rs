//! Prelude module for convenient imports

pub use crate::chain::Chain;
pub use crate::config::{ChainConfig, UnhandledErrorPolicy};
pub use crate::error::{ChainError, ChainResult, StreamError};
pub use crate::observer::{CallbackObserver, Notification, Observer, Subscriber};
pub use crate::operator::{OperatorKind, ShareArgs, TapArgs};
pub use crate::ops;
pub use crate::scheduler::{Scheduler, VirtualTimeScheduler};
pub use crate::stream::Stream;
pub use crate::subject::Subject;
pub use crate::subscription::Subscription;

#[cfg(feature = "tokio")]
pub use crate::scheduler::TokioScheduler;
