//! `start_with`

use std::rc::Rc;

use super::{ForwardObserver, subscribe_upstream};
use crate::observer::Subscriber;
use crate::stream::Stream;

pub(crate) fn start_with<T: Clone + 'static>(source: Stream<T>, values: Rc<Vec<T>>) -> Stream<T> {
    Stream::create(move |downstream: Subscriber<T>| {
        for value in values.iter() {
            if downstream.is_closed() {
                return;
            }
            downstream.next(value.clone());
        }
        if downstream.is_closed() {
            return;
        }
        subscribe_upstream(
            &source,
            downstream.subscription(),
            ForwardObserver::new(downstream.clone()),
        );
    })
}
