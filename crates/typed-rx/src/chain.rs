//! Typed operator chains
//!
//! A [`Chain`] wraps a source stream and grows one step per [`Chain::call`].
//! The element type flows through the generics, so appending an operator
//! whose input type differs from the chain's current element type does not
//! compile:
//!
//! ```compile_fail
//! use typed_rx::{Chain, Stream, ops};
//!
//! let chain = Chain::new(Stream::of(vec![1, 2, 3]))
//!     .call(ops::map(|v: i32, _| v.to_string()))
//!     .call(ops::filter(|v: &i32, _| *v > 1));
//! ```

use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::config;
use crate::error::StreamError;
use crate::observer::{CallbackObserver, Observer};
use crate::operator::{Operator, OperatorKind};
use crate::operators;
use crate::stream::Stream;
use crate::subscription::Subscription;

/// A source stream plus the operator steps applied to it
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use typed_rx::{Chain, Stream, ops};
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = seen.clone();
///
/// Chain::new(Stream::of(vec![1, 2, 3, 4]))
///     .call(ops::filter(|v: &i32, _| v % 2 == 0))
///     .call(ops::map(|v: i32, i| format!("{i}:{v}")))
///     .subscribe(move |s| sink.borrow_mut().push(s));
///
/// assert_eq!(*seen.borrow(), vec!["0:2", "1:4"]);
/// ```
pub struct Chain<T> {
    stream: Stream<T>,
    steps: Rc<Vec<OperatorKind>>,
}

impl<T> Clone for Chain<T> {
    fn clone(&self) -> Self {
        Self {
            stream: self.stream.clone(),
            steps: self.steps.clone(),
        }
    }
}

impl<T: Clone + 'static> Chain<T> {
    /// Start a chain with no steps
    pub fn new(source: Stream<T>) -> Self {
        Self {
            stream: source,
            steps: Rc::new(Vec::new()),
        }
    }

    /// Append an operator step.
    ///
    /// `self` is left untouched; both chains can be extended independently.
    pub fn call<R: Clone + 'static>(&self, operator: Operator<T, R>) -> Chain<R> {
        let kind = operator.kind();
        if config::current().trace_steps {
            trace!(operator = %kind, step = self.steps.len(), "Appending chain step");
        }

        let source = self.stream.clone();
        let stream = match operator {
            Operator::Map { project } => operators::map::map(source, project),
            Operator::SwitchMap { project } => operators::switch_map::switch_map(source, project),
            Operator::Filter { predicate, same } => {
                same.cast(operators::filter::filter(source, predicate))
            }
            Operator::CatchError { selector, same } => {
                same.cast(operators::catch::catch_error(source, selector))
            }
            Operator::Tap { args, same } => same.cast(operators::tap::tap(source, args)),
            Operator::First { args, same } => same.cast(operators::first::first(source, args)),
            Operator::StartWith { values, same } => {
                same.cast(operators::start_with::start_with(source, values))
            }
            Operator::DebounceTime { timing, same } => {
                same.cast(operators::debounce_time::debounce_time(source, timing))
            }
            Operator::AuditTime { timing, same } => {
                same.cast(operators::audit_time::audit_time(source, timing))
            }
            Operator::TakeUntil { notifier, same } => {
                same.cast(operators::take_until::take_until(source, notifier))
            }
            Operator::Share { args, same } => same.cast(operators::share::share(source, args)),
            Operator::Finalize { action, same } => {
                same.cast(operators::finalize::finalize(source, action))
            }
        };

        let mut steps = Vec::with_capacity(self.steps.len().saturating_add(1));
        steps.extend(self.steps.iter().copied());
        steps.push(kind);
        Chain {
            stream,
            steps: Rc::new(steps),
        }
    }

    /// Subscribe a value callback.
    ///
    /// Errors reach the unhandled-error channel.
    pub fn subscribe<F>(&self, on_value: F) -> Subscription
    where
        F: FnMut(T) + 'static,
    {
        self.subscribe_with(CallbackObserver::new(on_value))
    }

    /// Subscribe value, error and completion callbacks
    pub fn subscribe_all<N, E, C>(&self, on_next: N, on_error: E, on_complete: C) -> Subscription
    where
        N: FnMut(T) + 'static,
        E: FnMut(StreamError) + 'static,
        C: FnMut() + 'static,
    {
        self.subscribe_with(
            CallbackObserver::new(on_next)
                .on_error(on_error)
                .on_complete(on_complete),
        )
    }

    /// Subscribe an observer
    pub fn subscribe_with<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T> + 'static,
    {
        debug!(steps = self.steps.len(), "Subscribing chain");
        self.stream.subscribe_with(observer)
    }

    /// The composed stream, not subscribed
    pub fn result(&self) -> Stream<T> {
        self.stream.clone()
    }

    /// Applied operator kinds, in order
    pub fn steps(&self) -> &[OperatorKind] {
        &self.steps
    }

    /// Number of applied steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if no step has been applied
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<T: Clone + 'static> From<Stream<T>> for Chain<T> {
    fn from(source: Stream<T>) -> Self {
        Self::new(source)
    }
}

impl<T> fmt::Debug for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("steps", &self.steps).finish()
    }
}
