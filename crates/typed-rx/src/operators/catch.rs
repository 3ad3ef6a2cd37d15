//! `catch_error`

use super::{ForwardObserver, subscribe_upstream};
use crate::error::StreamError;
use crate::observer::{Observer, Subscriber};
use crate::operator::SelectorFn;
use crate::stream::Stream;

struct CatchObserver<T> {
    downstream: Subscriber<T>,
    source: Stream<T>,
    selector: SelectorFn<T>,
}

impl<T: 'static> Observer<T> for CatchObserver<T> {
    fn next(&mut self, value: T) {
        self.downstream.next(value);
    }

    fn error(&mut self, err: StreamError) {
        tracing::debug!(error = %err, "Recovering from upstream error");
        let caught = catch_error(self.source.clone(), self.selector.clone());
        let recovery = (self.selector)(err, caught);
        subscribe_upstream(
            &recovery,
            self.downstream.subscription(),
            ForwardObserver::new(self.downstream.clone()),
        );
    }

    fn complete(&mut self) {
        self.downstream.complete();
    }
}

/// Replace a failed source with the stream returned by `selector`.
///
/// The selector also receives the caught stream itself; returning it
/// resubscribes the source.
pub(crate) fn catch_error<T: 'static>(source: Stream<T>, selector: SelectorFn<T>) -> Stream<T> {
    Stream::create(move |downstream: Subscriber<T>| {
        let observer = CatchObserver {
            downstream: downstream.clone(),
            source: source.clone(),
            selector: selector.clone(),
        };
        subscribe_upstream(&source, downstream.subscription(), observer);
    })
}
