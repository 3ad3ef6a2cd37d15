//! Operator implementations
//!
//! Each operator is a function from a source [`Stream`] (plus its arguments)
//! to a new stream. Subscribing the result subscribes the source with an
//! operator-specific observer that forwards into the downstream subscriber.

pub(crate) mod audit_time;
pub(crate) mod catch;
pub(crate) mod debounce_time;
pub(crate) mod filter;
pub(crate) mod finalize;
pub(crate) mod first;
pub(crate) mod map;
pub(crate) mod share;
pub(crate) mod start_with;
pub(crate) mod switch_map;
pub(crate) mod take_until;
pub(crate) mod tap;

use crate::error::StreamError;
use crate::observer::{Observer, Subscriber};
use crate::stream::Stream;
use crate::subscription::Subscription;

/// Subscribe `source` with `observer`, closing it whenever `downstream` closes
pub(crate) fn subscribe_upstream<T, O>(
    source: &Stream<T>,
    downstream: &Subscription,
    observer: O,
) -> Subscriber<T>
where
    T: 'static,
    O: Observer<T> + 'static,
{
    let upstream = Subscriber::new(observer);
    downstream.add_child(upstream.subscription());
    source.subscribe_subscriber(upstream.clone());
    upstream
}

/// Relays every event unchanged
pub(crate) struct ForwardObserver<T> {
    downstream: Subscriber<T>,
}

impl<T> ForwardObserver<T> {
    pub(crate) fn new(downstream: Subscriber<T>) -> Self {
        Self { downstream }
    }
}

impl<T: 'static> Observer<T> for ForwardObserver<T> {
    fn next(&mut self, value: T) {
        self.downstream.next(value);
    }

    fn error(&mut self, err: StreamError) {
        self.downstream.error(err);
    }

    fn complete(&mut self) {
        self.downstream.complete();
    }
}
