//! `take_until`

use super::{ForwardObserver, subscribe_upstream};
use crate::error::StreamError;
use crate::observer::{Observer, Subscriber};
use crate::stream::Stream;

struct NotifierObserver<T> {
    downstream: Subscriber<T>,
}

impl<T: 'static> Observer<()> for NotifierObserver<T> {
    fn next(&mut self, _signal: ()) {
        self.downstream.complete();
    }

    fn error(&mut self, err: StreamError) {
        self.downstream.error(err);
    }

    fn complete(&mut self) {}
}

pub(crate) fn take_until<T: 'static>(source: Stream<T>, notifier: Stream<()>) -> Stream<T> {
    Stream::create(move |downstream: Subscriber<T>| {
        subscribe_upstream(
            &notifier,
            downstream.subscription(),
            NotifierObserver {
                downstream: downstream.clone(),
            },
        );
        if downstream.is_closed() {
            tracing::trace!("Notifier fired during subscribe, source skipped");
            return;
        }
        subscribe_upstream(
            &source,
            downstream.subscription(),
            ForwardObserver::new(downstream.clone()),
        );
    })
}
