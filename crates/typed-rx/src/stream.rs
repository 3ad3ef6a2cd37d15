//! Lazy push-based streams
//!
//! A [`Stream`] is a shared producer function. Nothing happens until it is
//! subscribed; every subscription runs the producer again (cold semantics)
//! unless a `share` step sits upstream.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::error::StreamError;
use crate::observer::{CallbackObserver, Observer, Subscriber};
use crate::operators;
use crate::scheduler::Scheduler;
use crate::subscription::Subscription;

type Producer<T> = dyn Fn(Subscriber<T>);

/// Lazy, possibly infinite sequence of values with completion and error
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use typed_rx::Stream;
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = seen.clone();
/// Stream::of(vec![1, 2, 3]).subscribe(move |v| sink.borrow_mut().push(v));
/// assert_eq!(*seen.borrow(), vec![1, 2, 3]);
/// ```
pub struct Stream<T> {
    producer: Rc<Producer<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            producer: self.producer.clone(),
        }
    }
}

impl<T: 'static> Stream<T> {
    /// Create a stream from a producer function.
    ///
    /// The producer runs once per subscription. It pushes events into the
    /// subscriber and registers on it whatever must be released on cancel.
    pub fn create<F>(producer: F) -> Self
    where
        F: Fn(Subscriber<T>) + 'static,
    {
        Self {
            producer: Rc::new(producer),
        }
    }

    /// A stream that completes immediately
    pub fn empty() -> Self {
        Self::create(|subscriber: Subscriber<T>| subscriber.complete())
    }

    /// A stream that never emits and never terminates
    pub fn never() -> Self {
        Self::create(|_subscriber: Subscriber<T>| {})
    }

    /// A stream that fails immediately with `err`
    pub fn fail(err: StreamError) -> Self {
        Self::create(move |subscriber: Subscriber<T>| subscriber.error(err.clone()))
    }

    /// A stream over a restartable iterator.
    ///
    /// Emission stops as soon as the subscriber closes.
    pub fn from_iterable<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + 'static,
    {
        Self::create(move |subscriber: Subscriber<T>| {
            for value in iter.clone() {
                if subscriber.is_closed() {
                    return;
                }
                subscriber.next(value);
            }
            subscriber.complete();
        })
    }

    /// Run the producer for an existing subscriber
    pub fn subscribe_subscriber(&self, subscriber: Subscriber<T>) {
        (self.producer)(subscriber);
    }

    /// Subscribe an observer
    pub fn subscribe_with<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T> + 'static,
    {
        let subscriber = Subscriber::new(observer);
        let subscription = subscriber.subscription().clone();
        self.subscribe_subscriber(subscriber);
        subscription
    }

    /// Subscribe a value callback; errors go to the unhandled-error channel
    pub fn subscribe<F>(&self, on_value: F) -> Subscription
    where
        F: FnMut(T) + 'static,
    {
        self.subscribe_with(CallbackObserver::new(on_value))
    }

    /// Map every value to `()`, keeping only the timing of emissions
    pub fn signal(&self) -> Stream<()> {
        operators::map::map(
            self.clone(),
            operators::map::project_fn(|_value: T, _index| ()),
        )
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// A stream emitting `values` in order, then completing
    pub fn of(values: Vec<T>) -> Self {
        Self::from_iterable(values)
    }
}

impl Stream<()> {
    /// Emit once after `delay`, then complete
    pub fn timer(delay: Duration, scheduler: Rc<dyn Scheduler>) -> Self {
        Self::create(move |subscriber: Subscriber<()>| {
            let target = subscriber.clone();
            let timer = scheduler.schedule(
                delay,
                Box::new(move || {
                    target.next(());
                    target.complete();
                }),
            );
            subscriber.add_teardown(move || timer.unsubscribe());
        })
    }
}

impl Stream<u64> {
    /// Emit 0, 1, 2, ... every `period`, never completing
    pub fn interval(period: Duration, scheduler: Rc<dyn Scheduler>) -> Self {
        Self::create(move |subscriber: Subscriber<u64>| {
            let slot: TimerSlot = Rc::new(RefCell::new(None));
            let pending = slot.clone();
            subscriber.add_teardown(move || {
                let timer = pending.borrow_mut().take();
                if let Some(timer) = timer {
                    timer.unsubscribe();
                }
            });
            schedule_tick(scheduler.clone(), period, subscriber, slot, 0);
        })
    }
}

type TimerSlot = Rc<RefCell<Option<Subscription>>>;

fn schedule_tick(
    scheduler: Rc<dyn Scheduler>,
    period: Duration,
    subscriber: Subscriber<u64>,
    slot: TimerSlot,
    tick: u64,
) {
    if subscriber.is_closed() {
        return;
    }
    let next_scheduler = scheduler.clone();
    let next_slot = slot.clone();
    let timer = scheduler.schedule(
        period,
        Box::new(move || {
            subscriber.next(tick);
            schedule_tick(
                next_scheduler,
                period,
                subscriber,
                next_slot,
                tick.wrapping_add(1),
            );
        }),
    );
    *slot.borrow_mut() = Some(timer);
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}
