//! `share`
//!
//! Ref-counted multicast. The first subscriber connects the source through an
//! internal [`Subject`]; later subscribers attach to the same subject. The
//! shared state is reset before the subject forwards a source terminal event,
//! so a subscriber arriving afterwards starts a fresh execution.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::error::StreamError;
use crate::observer::{Observer, Subscriber};
use crate::operator::ShareArgs;
use crate::stream::Stream;
use crate::subject::Subject;
use crate::subscription::Subscription;

struct ShareState<T> {
    subject: Option<Subject<T>>,
    connection: Option<Subscription>,
    ref_count: usize,
    generation: u64,
}

impl<T> ShareState<T> {
    /// Forget the current execution, returning its connection
    fn reset(&mut self) -> Option<Subscription> {
        self.subject = None;
        self.ref_count = 0;
        self.generation = self.generation.wrapping_add(1);
        self.connection.take()
    }
}

type SharedState<T> = Rc<RefCell<ShareState<T>>>;

struct SourceObserver<T> {
    subject: Subject<T>,
    state: Weak<RefCell<ShareState<T>>>,
    generation: u64,
}

impl<T: Clone + 'static> SourceObserver<T> {
    fn reset_state(&self) {
        if let Some(state) = self.state.upgrade() {
            let mut state = state.borrow_mut();
            if state.generation == self.generation {
                let connection = state.reset();
                drop(connection);
            }
        }
    }
}

impl<T: Clone + 'static> Observer<T> for SourceObserver<T> {
    fn next(&mut self, value: T) {
        self.subject.next(value);
    }

    fn error(&mut self, err: StreamError) {
        debug!(error = %err, "Shared source failed, resetting");
        self.reset_state();
        self.subject.error(err);
    }

    fn complete(&mut self) {
        debug!("Shared source completed, resetting");
        self.reset_state();
        self.subject.complete();
    }
}

fn release<T>(state: &Weak<RefCell<ShareState<T>>>, generation: u64, reset_on_zero: bool) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let connection = {
        let mut state = state.borrow_mut();
        if state.generation != generation {
            return;
        }
        state.ref_count = state.ref_count.saturating_sub(1);
        if state.ref_count > 0 || !reset_on_zero {
            return;
        }
        state.reset()
    };
    if let Some(connection) = connection {
        debug!("Last shared subscriber left, disconnecting");
        connection.unsubscribe();
    }
}

pub(crate) fn share<T: Clone + 'static>(source: Stream<T>, args: ShareArgs) -> Stream<T> {
    let state: SharedState<T> = Rc::new(RefCell::new(ShareState {
        subject: None,
        connection: None,
        ref_count: 0,
        generation: 0,
    }));

    Stream::create(move |downstream: Subscriber<T>| {
        let (subject, generation, connect) = {
            let mut guard = state.borrow_mut();
            let connect = guard.subject.is_none();
            let subject = guard.subject.get_or_insert_with(Subject::new).clone();
            guard.ref_count = guard.ref_count.saturating_add(1);
            (subject, guard.generation, connect)
        };

        let weak = Rc::downgrade(&state);
        downstream.add_teardown(move || {
            release(&weak, generation, args.reset_on_ref_count_zero);
        });
        subject.as_stream().subscribe_subscriber(downstream);

        if connect {
            debug!("Connecting shared source");
            let connection = Subscriber::new(SourceObserver {
                subject,
                state: Rc::downgrade(&state),
                generation,
            });
            {
                let mut guard = state.borrow_mut();
                if guard.generation == generation {
                    guard.connection = Some(connection.subscription().clone());
                }
            }
            source.subscribe_subscriber(connection);
        }
    })
}
