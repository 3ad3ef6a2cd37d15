//! `tap`

use std::rc::Rc;

use super::subscribe_upstream;
use crate::error::StreamError;
use crate::observer::{Observer, Subscriber};
use crate::operator::TapArgs;
use crate::stream::Stream;

pub(crate) type SharedTap<T> = Rc<TapArgs<T>>;

struct TapObserver<T> {
    downstream: Subscriber<T>,
    args: SharedTap<T>,
}

impl<T: 'static> Observer<T> for TapObserver<T> {
    fn next(&mut self, value: T) {
        if let Some(on_next) = self.args.on_next.as_ref() {
            on_next(&value);
        }
        self.downstream.next(value);
    }

    fn error(&mut self, err: StreamError) {
        if let Some(on_error) = self.args.on_error.as_ref() {
            on_error(&err);
        }
        self.downstream.error(err);
    }

    fn complete(&mut self) {
        if let Some(on_complete) = self.args.on_complete.as_ref() {
            on_complete();
        }
        self.downstream.complete();
    }
}

pub(crate) fn tap<T: 'static>(source: Stream<T>, args: SharedTap<T>) -> Stream<T> {
    Stream::create(move |downstream: Subscriber<T>| {
        let observer = TapObserver {
            downstream: downstream.clone(),
            args: args.clone(),
        };
        subscribe_upstream(&source, downstream.subscription(), observer);
    })
}
