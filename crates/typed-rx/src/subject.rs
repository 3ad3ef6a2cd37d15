//! Hot multicast source

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::StreamError;
use crate::observer::{Observer, Subscriber};
use crate::stream::Stream;

#[derive(Debug, Clone)]
enum Terminal {
    Completed,
    Failed(StreamError),
}

struct SubjectState<T> {
    observers: Vec<(u64, Subscriber<T>)>,
    next_id: u64,
    terminal: Option<Terminal>,
}

/// A stream that is also an observer
///
/// Values pushed into a subject reach every observer subscribed at that
/// moment. Observers subscribing after termination receive the terminal event
/// immediately.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use typed_rx::Subject;
///
/// let subject = Subject::new();
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = seen.clone();
/// subject.as_stream().subscribe(move |v: i32| sink.borrow_mut().push(v));
///
/// subject.next(1);
/// subject.next(2);
/// assert_eq!(*seen.borrow(), vec![1, 2]);
/// ```
pub struct Subject<T> {
    state: Rc<RefCell<SubjectState<T>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: Clone + 'static> Subject<T> {
    /// Create a subject with no observers
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SubjectState {
                observers: Vec::new(),
                next_id: 0,
                terminal: None,
            })),
        }
    }

    /// Push a value to every current observer
    pub fn next(&self, value: T) {
        let targets = {
            let state = self.state.borrow();
            if state.terminal.is_some() {
                return;
            }
            state
                .observers
                .iter()
                .map(|(_, subscriber)| subscriber.clone())
                .collect::<Vec<_>>()
        };
        for target in targets {
            target.next(value.clone());
        }
    }

    /// Fail every current and future observer
    pub fn error(&self, err: StreamError) {
        let Some(targets) = self.terminate(Terminal::Failed(err.clone())) else {
            return;
        };
        for target in targets {
            target.error(err.clone());
        }
    }

    /// Complete every current and future observer
    pub fn complete(&self) {
        let Some(targets) = self.terminate(Terminal::Completed) else {
            return;
        };
        for target in targets {
            target.complete();
        }
    }

    /// Number of currently attached observers
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    /// Check if the subject has completed or failed
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.state.borrow().terminal.is_some()
    }

    /// View the subject as a stream
    pub fn as_stream(&self) -> Stream<T> {
        let state = self.state.clone();
        Stream::create(move |subscriber: Subscriber<T>| attach(&state, subscriber))
    }

    fn terminate(&self, terminal: Terminal) -> Option<Vec<Subscriber<T>>> {
        let mut state = self.state.borrow_mut();
        if state.terminal.is_some() {
            return None;
        }
        state.terminal = Some(terminal);
        let observers = std::mem::take(&mut state.observers);
        Some(observers.into_iter().map(|(_, subscriber)| subscriber).collect())
    }
}

fn attach<T: 'static>(state: &Rc<RefCell<SubjectState<T>>>, subscriber: Subscriber<T>) {
    let registered = {
        let mut guard = state.borrow_mut();
        match guard.terminal.clone() {
            Some(terminal) => Err(terminal),
            None => {
                let id = guard.next_id;
                guard.next_id = guard.next_id.wrapping_add(1);
                guard.observers.push((id, subscriber.clone()));
                Ok(id)
            }
        }
    };

    match registered {
        Ok(id) => {
            let weak = Rc::downgrade(state);
            subscriber.add_teardown(move || {
                if let Some(state) = weak.upgrade() {
                    let removed = {
                        let mut guard = state.borrow_mut();
                        let position = guard.observers.iter().position(|(other, _)| *other == id);
                        position.map(|index| guard.observers.remove(index))
                    };
                    drop(removed);
                }
            });
        }
        Err(Terminal::Completed) => subscriber.complete(),
        Err(Terminal::Failed(err)) => subscriber.error(err),
    }
}

impl<T: Clone + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Observer<T> for Subject<T> {
    fn next(&mut self, value: T) {
        Subject::next(self, value);
    }

    fn error(&mut self, err: StreamError) {
        Subject::error(self, err);
    }

    fn complete(&mut self) {
        Subject::complete(self);
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Subject")
            .field("observers", &state.observers.len())
            .field("terminal", &state.terminal)
            .finish()
    }
}
