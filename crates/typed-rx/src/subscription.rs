//! Cancelable subscriptions
//!
//! A [`Subscription`] owns a list of teardown actions. Unsubscribing closes it
//! once and runs every teardown exactly once; teardowns added after close run
//! immediately.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type Teardown = Box<dyn FnOnce()>;

#[derive(Default)]
struct SubscriptionInner {
    closed: Cell<bool>,
    teardowns: RefCell<Vec<Teardown>>,
}

/// Handle to an active observation
///
/// Cloning shares the same underlying subscription.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use typed_rx::Subscription;
///
/// let released = Rc::new(Cell::new(0));
/// let subscription = Subscription::new();
/// let counter = released.clone();
/// subscription.add(move || counter.set(counter.get() + 1));
///
/// subscription.unsubscribe();
/// subscription.unsubscribe();
/// assert_eq!(released.get(), 1);
/// ```
#[derive(Clone, Default)]
pub struct Subscription {
    inner: Rc<SubscriptionInner>,
}

impl Subscription {
    /// Create an open subscription with no teardowns
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the subscription has been closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }

    /// Register a teardown to run when the subscription closes.
    ///
    /// Runs immediately if the subscription is already closed.
    pub fn add<F>(&self, teardown: F)
    where
        F: FnOnce() + 'static,
    {
        if self.is_closed() {
            teardown();
            return;
        }
        self.inner.teardowns.borrow_mut().push(Box::new(teardown));
    }

    /// Close `child` whenever this subscription closes
    pub fn add_child(&self, child: &Subscription) {
        if self.same_as(child) {
            return;
        }
        let child = child.clone();
        self.add(move || child.unsubscribe());
    }

    /// Close the subscription and run its teardowns.
    ///
    /// Idempotent: only the first call has an effect.
    pub fn unsubscribe(&self) {
        if self.inner.closed.replace(true) {
            return;
        }
        // Taken out so teardowns may register or close other subscriptions freely
        let teardowns = std::mem::take(&mut *self.inner.teardowns.borrow_mut());
        for teardown in teardowns {
            teardown();
        }
    }

    /// Check if both handles refer to the same subscription
    #[must_use]
    pub fn same_as(&self, other: &Subscription) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn pending_teardowns(&self) -> usize {
        self.inner.teardowns.borrow().len()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .field("teardowns", &self.pending_teardowns())
            .finish()
    }
}
