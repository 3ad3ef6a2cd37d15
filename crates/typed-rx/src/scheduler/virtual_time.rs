//! Deterministic scheduler driven by hand

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use super::{Scheduler, Task};
use crate::subscription::Subscription;

type TaskKey = (Duration, u64);

#[derive(Default)]
struct VirtualState {
    now: Duration,
    next_seq: u64,
    tasks: BTreeMap<TaskKey, Task>,
}

/// Scheduler with a virtual clock
///
/// Time only moves when [`advance_by`](Self::advance_by) or
/// [`advance_to`](Self::advance_to) is called. Due tasks run in due-time order,
/// ties in scheduling order. Tasks scheduled while advancing run in the same
/// call if they fall due before the target.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use std::time::Duration;
/// use typed_rx::scheduler::{Scheduler, VirtualTimeScheduler};
///
/// let scheduler = VirtualTimeScheduler::new();
/// let fired = Rc::new(Cell::new(false));
/// let flag = fired.clone();
/// scheduler.schedule(Duration::from_millis(10), Box::new(move || flag.set(true)));
///
/// scheduler.advance_by(Duration::from_millis(9));
/// assert!(!fired.get());
/// scheduler.advance_by(Duration::from_millis(1));
/// assert!(fired.get());
/// ```
#[derive(Clone, Default)]
pub struct VirtualTimeScheduler {
    state: Rc<RefCell<VirtualState>>,
}

impl VirtualTimeScheduler {
    /// Create a scheduler at time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    /// Move the clock forward by `delta`, running due tasks
    pub fn advance_by(&self, delta: Duration) {
        let target = self.state.borrow().now.saturating_add(delta);
        self.advance_to(target);
    }

    /// Move the clock to `target`, running due tasks.
    ///
    /// A target in the past leaves the clock unchanged.
    pub fn advance_to(&self, target: Duration) {
        loop {
            let due = {
                let mut state = self.state.borrow_mut();
                let key = match state.tasks.first_key_value() {
                    Some((&key, _)) if key.0 <= target => key,
                    _ => break,
                };
                if key.0 > state.now {
                    state.now = key.0;
                }
                state.tasks.remove(&key)
            };
            // Borrow released: the task may schedule or cancel
            if let Some(task) = due {
                task();
            }
        }

        let mut state = self.state.borrow_mut();
        if target > state.now {
            state.now = target;
        }
    }
}

impl Scheduler for VirtualTimeScheduler {
    fn now(&self) -> Duration {
        self.state.borrow().now
    }

    fn schedule(&self, delay: Duration, task: Task) -> Subscription {
        let key = {
            let mut state = self.state.borrow_mut();
            let key = (state.now.saturating_add(delay), state.next_seq);
            state.next_seq = state.next_seq.wrapping_add(1);
            state.tasks.insert(key, task);
            key
        };

        let subscription = Subscription::new();
        let weak = Rc::downgrade(&self.state);
        subscription.add(move || {
            if let Some(state) = weak.upgrade() {
                let cancelled = state.borrow_mut().tasks.remove(&key);
                drop(cancelled);
            }
        });
        subscription
    }
}

impl fmt::Debug for VirtualTimeScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("VirtualTimeScheduler")
            .field("now", &state.now)
            .field("pending", &state.tasks.len())
            .finish()
    }
}
