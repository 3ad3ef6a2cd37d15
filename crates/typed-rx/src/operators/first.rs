//! `first`

use std::rc::Rc;

use super::subscribe_upstream;
use crate::error::StreamError;
use crate::observer::{Observer, Subscriber};
use crate::operator::FirstArgs;
use crate::stream::Stream;

struct FirstObserver<T> {
    downstream: Subscriber<T>,
    args: Rc<FirstArgs<T>>,
}

impl<T: Clone + 'static> Observer<T> for FirstObserver<T> {
    fn next(&mut self, value: T) {
        let matched = match self.args.predicate.as_ref() {
            Some(predicate) => predicate(&value),
            None => true,
        };
        if matched {
            // Completing downstream closes the upstream subscription
            self.downstream.next(value);
            self.downstream.complete();
        }
    }

    fn error(&mut self, err: StreamError) {
        self.downstream.error(err);
    }

    fn complete(&mut self) {
        match self.args.default.clone() {
            Some(default) => {
                self.downstream.next(default);
                self.downstream.complete();
            }
            None => self.downstream.error(StreamError::EmptySequence),
        }
    }
}

pub(crate) fn first<T: Clone + 'static>(source: Stream<T>, args: Rc<FirstArgs<T>>) -> Stream<T> {
    Stream::create(move |downstream: Subscriber<T>| {
        let observer = FirstObserver {
            downstream: downstream.clone(),
            args: args.clone(),
        };
        subscribe_upstream(&source, downstream.subscription(), observer);
    })
}
