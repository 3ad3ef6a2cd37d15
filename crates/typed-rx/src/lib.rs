//! Strongly typed reactive operator chains
//!
//! This crate builds pipelines over push-based streams from a closed set of
//! named operators. Each step is appended with [`Chain::call`], and the element
//! type produced by one step is checked at compile time against the input of
//! the next.
//!
//! # Architecture
//!
//! - [`stream`]: lazy, cold [`Stream`] values and their source constructors
//! - [`subject`]: [`Subject`], a hot multicast source
//! - [`observer`]: the [`Observer`] trait and the producer-facing [`Subscriber`]
//! - [`subscription`]: cancel handles with exactly-once teardown
//! - [`scheduler`]: timing sources for timed operators
//! - [`operator`]: the operator catalog and the typed [`Operator`] value
//! - [`ops`]: constructors for every operator
//! - [`chain`]: the [`Chain`] builder
//! - [`config`]: per-thread [`ChainConfig`] and the unhandled-error channel
//! - [`error`]: [`StreamError`] and [`ChainError`]
//!
//! # Execution model
//!
//! Everything runs on one thread. Events are delivered synchronously in
//! production order; re-entrant events are queued per subscriber. Timed
//! operators use a [`Scheduler`](scheduler::Scheduler) instead of blocking.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use typed_rx::prelude::*;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//!
//! let failing = Stream::create(|subscriber: Subscriber<i32>| {
//!     subscriber.next(1);
//!     subscriber.error(StreamError::upstream("lost"));
//! });
//!
//! Chain::new(failing)
//!     .call(ops::catch_error(|_err, _caught| Stream::of(vec![9])))
//!     .call(ops::map(|v: i32, _| v * 10))
//!     .subscribe(move |v| sink.borrow_mut().push(v));
//!
//! assert_eq!(*seen.borrow(), vec![10, 90]);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod chain;
pub mod config;
pub mod error;
pub mod observer;
pub mod operator;
mod operators;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod stream;
pub mod subject;
pub mod subscription;

pub use chain::Chain;
pub use config::{ChainConfig, UnhandledErrorPolicy};
pub use error::{ChainError, ChainResult, StreamError};
pub use observer::{CallbackObserver, Notification, Observer, Subscriber};
pub use operator::{
    ElementShape, Operator, OperatorDescriptor, OperatorKind, ShareArgs, TapArgs, catalog,
};
pub use stream::Stream;
pub use subject::Subject;
pub use subscription::Subscription;
