//! `filter`

use super::subscribe_upstream;
use crate::error::StreamError;
use crate::observer::{Observer, Subscriber};
use crate::operator::PredicateFn;
use crate::stream::Stream;

struct FilterObserver<T> {
    downstream: Subscriber<T>,
    predicate: PredicateFn<T>,
    index: usize,
}

impl<T: 'static> Observer<T> for FilterObserver<T> {
    fn next(&mut self, value: T) {
        let index = self.index;
        self.index = self.index.wrapping_add(1);
        if (self.predicate)(&value, index) {
            self.downstream.next(value);
        }
    }

    fn error(&mut self, err: StreamError) {
        self.downstream.error(err);
    }

    fn complete(&mut self) {
        self.downstream.complete();
    }
}

pub(crate) fn filter<T: 'static>(source: Stream<T>, predicate: PredicateFn<T>) -> Stream<T> {
    Stream::create(move |downstream: Subscriber<T>| {
        let observer = FilterObserver {
            downstream: downstream.clone(),
            predicate: predicate.clone(),
            index: 0,
        };
        subscribe_upstream(&source, downstream.subscription(), observer);
    })
}
