//! `finalize`

use super::{ForwardObserver, subscribe_upstream};
use crate::config;
use crate::error::StreamError;
use crate::observer::Subscriber;
use crate::operator::CleanupFn;
use crate::stream::Stream;

fn run_cleanup(action: &CleanupFn) {
    if let Err(err) = action() {
        config::report_unhandled(StreamError::cleanup(err));
    }
}

/// Run `action` once when the subscription ends for any reason.
///
/// The action is registered after the source is subscribed, so it runs after
/// the terminal event reached downstream.
pub(crate) fn finalize<T: 'static>(source: Stream<T>, action: CleanupFn) -> Stream<T> {
    Stream::create(move |downstream: Subscriber<T>| {
        subscribe_upstream(
            &source,
            downstream.subscription(),
            ForwardObserver::new(downstream.clone()),
        );
        let action = action.clone();
        downstream.add_teardown(move || run_cleanup(&action));
    })
}
