//! Observers and the producer-facing [`Subscriber`] handle

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::config;
use crate::error::StreamError;
use crate::subscription::Subscription;

/// Receiver of stream events
pub trait Observer<T> {
    /// A value was produced
    fn next(&mut self, value: T);

    /// The stream failed; no further events follow
    fn error(&mut self, err: StreamError);

    /// The stream completed; no further events follow
    fn complete(&mut self);
}

/// A materialized stream event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification<T> {
    /// A value
    Next(T),
    /// Terminal failure
    Error(StreamError),
    /// Terminal completion
    Complete,
}

impl<T> Notification<T> {
    /// Check if this event ends the stream
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Next(_))
    }

    /// Hand the event to an observer
    pub fn deliver(self, observer: &mut dyn Observer<T>) {
        match self {
            Notification::Next(value) => observer.next(value),
            Notification::Error(err) => observer.error(err),
            Notification::Complete => observer.complete(),
        }
    }
}

/// Observer built from callbacks
///
/// Without an error callback, errors go to [`config::report_unhandled`].
pub struct CallbackObserver<T> {
    on_next: Box<dyn FnMut(T)>,
    on_error: Option<Box<dyn FnMut(StreamError)>>,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl<T> CallbackObserver<T> {
    /// Observer for values only
    pub fn new<F>(on_next: F) -> Self
    where
        F: FnMut(T) + 'static,
    {
        Self {
            on_next: Box::new(on_next),
            on_error: None,
            on_complete: None,
        }
    }

    /// Set the error callback
    pub fn on_error<F>(mut self, on_error: F) -> Self
    where
        F: FnMut(StreamError) + 'static,
    {
        self.on_error = Some(Box::new(on_error));
        self
    }

    /// Set the completion callback
    pub fn on_complete<F>(mut self, on_complete: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.on_complete = Some(Box::new(on_complete));
        self
    }
}

impl<T> Observer<T> for CallbackObserver<T> {
    fn next(&mut self, value: T) {
        (self.on_next)(value);
    }

    fn error(&mut self, err: StreamError) {
        match self.on_error.as_mut() {
            Some(on_error) => on_error(err),
            None => config::report_unhandled(err),
        }
    }

    fn complete(&mut self) {
        if let Some(on_complete) = self.on_complete.as_mut() {
            on_complete();
        }
    }
}

impl<T> fmt::Debug for CallbackObserver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackObserver")
            .field("has_error_handler", &self.on_error.is_some())
            .field("has_complete_handler", &self.on_complete.is_some())
            .finish()
    }
}

struct SubscriberInner<T> {
    observer: RefCell<Option<Box<dyn Observer<T>>>>,
    queue: RefCell<VecDeque<Notification<T>>>,
    stopped: Cell<bool>,
    delivering: Cell<bool>,
    subscription: Subscription,
}

/// Producer-facing side of a subscription
///
/// A subscriber accepts events from a producer and hands them to its observer:
/// - events after a terminal event, or after the subscription closed, are dropped
/// - events raised while an event is being delivered are queued and delivered
///   afterwards in order
/// - after delivering a terminal event the subscription closes itself, which
///   releases everything registered on it
pub struct Subscriber<T> {
    inner: Rc<SubscriberInner<T>>,
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Subscriber<T> {
    /// Wrap an observer in a fresh subscription
    pub fn new<O>(observer: O) -> Self
    where
        O: Observer<T> + 'static,
    {
        let inner = Rc::new(SubscriberInner {
            observer: RefCell::new(Some(Box::new(observer) as Box<dyn Observer<T>>)),
            queue: RefCell::new(VecDeque::new()),
            stopped: Cell::new(false),
            delivering: Cell::new(false),
            subscription: Subscription::new(),
        });

        let weak = Rc::downgrade(&inner);
        inner.subscription.add(move || {
            if let Some(inner) = weak.upgrade() {
                let observer = inner.observer.borrow_mut().take();
                inner.queue.borrow_mut().clear();
                drop(observer);
            }
        });

        Self { inner }
    }

    /// Deliver a value
    pub fn next(&self, value: T) {
        self.push(Notification::Next(value));
    }

    /// Deliver a failure and close
    pub fn error(&self, err: StreamError) {
        self.push(Notification::Error(err));
    }

    /// Deliver completion and close
    pub fn complete(&self) {
        self.push(Notification::Complete);
    }

    /// Deliver a materialized event
    pub fn notify(&self, notification: Notification<T>) {
        self.push(notification);
    }

    /// Check if further events would be dropped.
    ///
    /// Synchronous producers poll this between emissions to stop early.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.stopped.get() || self.inner.subscription.is_closed()
    }

    /// The subscription this subscriber feeds
    #[must_use]
    pub fn subscription(&self) -> &Subscription {
        &self.inner.subscription
    }

    /// Register a teardown on the subscription
    pub fn add_teardown<F>(&self, teardown: F)
    where
        F: FnOnce() + 'static,
    {
        self.inner.subscription.add(teardown);
    }

    /// Close without delivering a terminal event
    pub fn unsubscribe(&self) {
        self.inner.subscription.unsubscribe();
    }

    fn push(&self, notification: Notification<T>) {
        let inner = &self.inner;
        if self.is_closed() {
            tracing::trace!("Dropping event for a stopped subscriber");
            return;
        }
        if notification.is_terminal() {
            inner.stopped.set(true);
        }
        inner.queue.borrow_mut().push_back(notification);

        if inner.delivering.replace(true) {
            return;
        }

        loop {
            let next = inner.queue.borrow_mut().pop_front();
            let Some(notification) = next else {
                break;
            };
            let terminal = notification.is_terminal();

            // Out of the cell for the duration of the callback so re-entrant
            // pushes only touch the queue
            let observer = inner.observer.borrow_mut().take();
            if let Some(mut observer) = observer {
                notification.deliver(observer.as_mut());
                if !inner.subscription.is_closed() {
                    *inner.observer.borrow_mut() = Some(observer);
                }
            }

            if terminal {
                inner.subscription.unsubscribe();
            }
        }

        inner.delivering.set(false);
    }
}

impl<T> fmt::Debug for Subscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("stopped", &self.inner.stopped.get())
            .field("subscription", &self.inner.subscription)
            .finish()
    }
}
