//! `audit_time`
//!
//! The first value after an idle period opens a window. When the window
//! closes the most recent value seen during it is emitted and the operator
//! goes idle again. Values are only ever emitted at a window boundary, so a
//! value still pending when the source terminates is dropped.

use std::cell::RefCell;
use std::rc::Rc;

use super::subscribe_upstream;
use crate::error::StreamError;
use crate::observer::{Observer, Subscriber};
use crate::operator::TimingArgs;
use crate::stream::Stream;
use crate::subscription::Subscription;

struct AuditState<T> {
    latest: Option<T>,
    window: Option<Subscription>,
}

type SharedState<T> = Rc<RefCell<AuditState<T>>>;

fn discard_pending<T>(state: &SharedState<T>) {
    let (window, latest) = {
        let mut state = state.borrow_mut();
        (state.window.take(), state.latest.take())
    };
    if let Some(window) = window {
        window.unsubscribe();
    }
    drop(latest);
}

struct AuditObserver<T> {
    downstream: Subscriber<T>,
    timing: TimingArgs,
    state: SharedState<T>,
}

impl<T: 'static> Observer<T> for AuditObserver<T> {
    fn next(&mut self, value: T) {
        let idle = {
            let mut state = self.state.borrow_mut();
            state.latest = Some(value);
            state.window.is_none()
        };
        if !idle {
            return;
        }

        let state = self.state.clone();
        let downstream = self.downstream.clone();
        let window = self.timing.scheduler.schedule(
            self.timing.duration,
            Box::new(move || {
                let latest = {
                    let mut state = state.borrow_mut();
                    state.window = None;
                    state.latest.take()
                };
                if let Some(value) = latest {
                    downstream.next(value);
                }
            }),
        );
        self.state.borrow_mut().window = Some(window);
    }

    fn error(&mut self, err: StreamError) {
        discard_pending(&self.state);
        self.downstream.error(err);
    }

    fn complete(&mut self) {
        discard_pending(&self.state);
        self.downstream.complete();
    }
}

pub(crate) fn audit_time<T: 'static>(source: Stream<T>, timing: TimingArgs) -> Stream<T> {
    Stream::create(move |downstream: Subscriber<T>| {
        let state = Rc::new(RefCell::new(AuditState {
            latest: None,
            window: None,
        }));

        let release = state.clone();
        downstream.add_teardown(move || discard_pending(&release));

        let observer = AuditObserver {
            downstream: downstream.clone(),
            timing: timing.clone(),
            state,
        };
        subscribe_upstream(&source, downstream.subscription(), observer);
    })
}
