//! Counters for producer activity and callbacks.

use std::cell::Cell;
use std::rc::Rc;

use typed_rx::{Observer, Stream, StreamError, Subscriber};

#[derive(Default)]
struct ProbeCounts {
    subscriptions: Cell<usize>,
    teardowns: Cell<usize>,
    emitted: Cell<usize>,
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get().saturating_add(1));
}

/// Counts how often a source is subscribed, torn down and emits.
///
/// # Example
///
/// ```rust
/// use typed_rx::Stream;
/// use typed_rx_test_helpers::probe::ProducerProbe;
///
/// let probe = ProducerProbe::new();
/// let source = probe.wrap(Stream::of(vec![1, 2, 3]));
/// source.subscribe(|_| {});
/// assert_eq!(probe.subscriptions(), 1);
/// assert_eq!(probe.emitted(), 3);
/// assert_eq!(probe.teardowns(), 1);
/// ```
#[derive(Clone, Default)]
pub struct ProducerProbe {
    counts: Rc<ProbeCounts>,
}

struct Counting<T> {
    downstream: Subscriber<T>,
    counts: Rc<ProbeCounts>,
}

impl<T: 'static> Observer<T> for Counting<T> {
    fn next(&mut self, value: T) {
        bump(&self.counts.emitted);
        self.downstream.next(value);
    }

    fn error(&mut self, err: StreamError) {
        self.downstream.error(err);
    }

    fn complete(&mut self) {
        self.downstream.complete();
    }
}

impl ProducerProbe {
    /// Fresh probe with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `source` so its activity is counted
    pub fn wrap<T: 'static>(&self, source: Stream<T>) -> Stream<T> {
        let counts = self.counts.clone();
        Stream::create(move |downstream: Subscriber<T>| {
            bump(&counts.subscriptions);
            let released = counts.clone();
            downstream.add_teardown(move || bump(&released.teardowns));

            let upstream = Subscriber::new(Counting {
                downstream: downstream.clone(),
                counts: counts.clone(),
            });
            downstream.subscription().add_child(upstream.subscription());
            source.subscribe_subscriber(upstream);
        })
    }

    /// Times the wrapped source was subscribed
    pub fn subscriptions(&self) -> usize {
        self.counts.subscriptions.get()
    }

    /// Times a subscription to the wrapped source was released
    pub fn teardowns(&self) -> usize {
        self.counts.teardowns.get()
    }

    /// Values the wrapped source produced
    pub fn emitted(&self) -> usize {
        self.counts.emitted.get()
    }
}

/// Counts callback invocations
#[derive(Clone, Default)]
pub struct CallCounter {
    count: Rc<Cell<usize>>,
}

impl CallCounter {
    /// Counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call
    pub fn hit(&self) {
        bump(&self.count);
    }

    /// Calls recorded so far
    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// A callback that records a call each time it runs
    pub fn callback(&self) -> impl Fn() + 'static {
        let counter = self.clone();
        move || counter.hit()
    }
}
