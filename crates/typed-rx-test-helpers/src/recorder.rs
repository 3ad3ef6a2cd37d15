//! Recording observer.

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;
use std::time::Duration;

use typed_rx::scheduler::Scheduler;
use typed_rx::{Notification, Observer, StreamError};

struct Entry<T> {
    at: Option<Duration>,
    notification: Notification<T>,
}

/// Observer that keeps every event it receives.
///
/// Clones share the same log, so one clone can be handed to `subscribe_with`
/// while the test keeps another for assertions.
///
/// # Example
///
/// ```rust
/// use typed_rx::Stream;
/// use typed_rx_test_helpers::recorder::Recorder;
///
/// let recorder = Recorder::new();
/// Stream::of(vec![1, 2]).subscribe_with(recorder.clone());
/// assert_eq!(recorder.values(), vec![1, 2]);
/// assert!(recorder.is_completed());
/// ```
pub struct Recorder<T> {
    log: Rc<RefCell<Vec<Entry<T>>>>,
    clock: Option<Rc<dyn Scheduler>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            log: self.log.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<T: Clone> Recorder<T> {
    /// Recorder without timestamps
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            clock: None,
        }
    }

    /// Recorder stamping each event with `clock.now()`
    pub fn with_clock(clock: Rc<dyn Scheduler>) -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            clock: Some(clock),
        }
    }

    /// Every event in arrival order
    pub fn notifications(&self) -> Vec<Notification<T>> {
        self.log
            .borrow()
            .iter()
            .map(|entry| entry.notification.clone())
            .collect()
    }

    /// Received values in order
    pub fn values(&self) -> Vec<T> {
        self.log
            .borrow()
            .iter()
            .filter_map(|entry| match &entry.notification {
                Notification::Next(v) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }

    /// Received values with their timestamps.
    ///
    /// # Panics
    ///
    /// Panics if the recorder has no clock.
    pub fn timed_values(&self) -> Vec<(Duration, T)> {
        self.log
            .borrow()
            .iter()
            .filter_map(|entry| match (&entry.notification, entry.at) {
                (Notification::Next(v), Some(at)) => Some((at, v.clone())),
                (Notification::Next(_), None) => {
                    panic!("timed_values: recorder was created without a clock")
                }
                _ => None,
            })
            .collect()
    }

    /// Check if completion was received
    pub fn is_completed(&self) -> bool {
        self.log
            .borrow()
            .iter()
            .any(|entry| matches!(entry.notification, Notification::Complete))
    }

    /// The received error, if any
    pub fn error(&self) -> Option<StreamError> {
        self.log
            .borrow()
            .iter()
            .find_map(|entry| match &entry.notification {
                Notification::Error(e) => Some(e.clone()),
                _ => None,
            })
    }

    /// Number of terminal events received; more than one is a protocol violation
    pub fn terminal_count(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|entry| entry.notification.is_terminal())
            .count()
    }

    fn push(&self, notification: Notification<T>) {
        let at = self.clock.as_ref().map(|clock| clock.now());
        self.log.borrow_mut().push(Entry { at, notification });
    }
}

impl<T: Clone> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Observer<T> for Recorder<T> {
    fn next(&mut self, value: T) {
        self.push(Notification::Next(value));
    }

    fn error(&mut self, err: StreamError) {
        self.push(Notification::Error(err));
    }

    fn complete(&mut self) {
        self.push(Notification::Complete);
    }
}

impl<T: Clone + Debug> Debug for Recorder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("notifications", &self.notifications())
            .finish()
    }
}
