//! `debounce_time`
//!
//! Trailing-edge debounce: every value restarts the quiet-period timer and
//! only a value followed by a full quiet period is emitted.

use std::cell::RefCell;
use std::rc::Rc;

use super::subscribe_upstream;
use crate::error::StreamError;
use crate::observer::{Observer, Subscriber};
use crate::operator::TimingArgs;
use crate::stream::Stream;
use crate::subscription::Subscription;

struct DebounceState<T> {
    pending: Option<T>,
    timer: Option<Subscription>,
}

type SharedState<T> = Rc<RefCell<DebounceState<T>>>;

fn cancel_timer<T>(state: &SharedState<T>) {
    let timer = state.borrow_mut().timer.take();
    if let Some(timer) = timer {
        timer.unsubscribe();
    }
}

struct DebounceObserver<T> {
    downstream: Subscriber<T>,
    timing: TimingArgs,
    state: SharedState<T>,
}

impl<T: 'static> Observer<T> for DebounceObserver<T> {
    fn next(&mut self, value: T) {
        cancel_timer(&self.state);
        self.state.borrow_mut().pending = Some(value);

        let state = self.state.clone();
        let downstream = self.downstream.clone();
        let timer = self.timing.scheduler.schedule(
            self.timing.duration,
            Box::new(move || {
                let due = {
                    let mut state = state.borrow_mut();
                    state.timer = None;
                    state.pending.take()
                };
                if let Some(value) = due {
                    downstream.next(value);
                }
            }),
        );
        self.state.borrow_mut().timer = Some(timer);
    }

    fn error(&mut self, err: StreamError) {
        cancel_timer(&self.state);
        self.state.borrow_mut().pending = None;
        self.downstream.error(err);
    }

    fn complete(&mut self) {
        cancel_timer(&self.state);
        let pending = self.state.borrow_mut().pending.take();
        if let Some(value) = pending {
            self.downstream.next(value);
        }
        self.downstream.complete();
    }
}

pub(crate) fn debounce_time<T: 'static>(source: Stream<T>, timing: TimingArgs) -> Stream<T> {
    Stream::create(move |downstream: Subscriber<T>| {
        let state = Rc::new(RefCell::new(DebounceState {
            pending: None,
            timer: None,
        }));

        let release = state.clone();
        downstream.add_teardown(move || {
            cancel_timer(&release);
            release.borrow_mut().pending = None;
        });

        let observer = DebounceObserver {
            downstream: downstream.clone(),
            timing: timing.clone(),
            state,
        };
        subscribe_upstream(&source, downstream.subscription(), observer);
    })
}
