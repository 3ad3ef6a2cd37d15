//! `switch_map`
//!
//! Each outer value is projected to an inner stream. Subscribing a new inner
//! stream cancels the previous one first, so only the latest inner stream
//! reaches downstream. Completion waits for both the outer stream and the
//! active inner stream.

use std::cell::RefCell;
use std::rc::Rc;

use super::subscribe_upstream;
use crate::error::StreamError;
use crate::observer::{Observer, Subscriber};
use crate::operator::SwitchProjectFn;
use crate::stream::Stream;
use crate::subscription::Subscription;

#[derive(Default)]
struct SwitchState {
    inner: Option<Subscription>,
    outer_done: bool,
    generation: u64,
}

type SharedState = Rc<RefCell<SwitchState>>;

struct OuterObserver<T, R> {
    downstream: Subscriber<R>,
    project: SwitchProjectFn<T, R>,
    state: SharedState,
    index: usize,
}

impl<T, R: 'static> Observer<T> for OuterObserver<T, R> {
    fn next(&mut self, value: T) {
        let index = self.index;
        self.index = self.index.wrapping_add(1);
        let inner_stream = (self.project)(value, index);

        let previous = self.state.borrow_mut().inner.take();
        if let Some(previous) = previous {
            previous.unsubscribe();
        }

        let generation = {
            let mut state = self.state.borrow_mut();
            state.generation = state.generation.wrapping_add(1);
            state.generation
        };
        let inner = Subscriber::new(InnerObserver {
            downstream: self.downstream.clone(),
            state: self.state.clone(),
            generation,
        });
        // Registered before subscribing so a synchronous inner completion
        // finds its own entry
        self.state.borrow_mut().inner = Some(inner.subscription().clone());
        inner_stream.subscribe_subscriber(inner);
    }

    fn error(&mut self, err: StreamError) {
        self.downstream.error(err);
    }

    fn complete(&mut self) {
        let inner_active = {
            let mut state = self.state.borrow_mut();
            state.outer_done = true;
            state.inner.is_some()
        };
        if !inner_active {
            self.downstream.complete();
        }
    }
}

struct InnerObserver<R> {
    downstream: Subscriber<R>,
    state: SharedState,
    generation: u64,
}

impl<R: 'static> InnerObserver<R> {
    fn is_current(&self) -> bool {
        self.state.borrow().generation == self.generation
    }
}

impl<R: 'static> Observer<R> for InnerObserver<R> {
    fn next(&mut self, value: R) {
        if self.is_current() {
            self.downstream.next(value);
        }
    }

    fn error(&mut self, err: StreamError) {
        if self.is_current() {
            self.downstream.error(err);
        }
    }

    fn complete(&mut self) {
        let outer_done = {
            let mut state = self.state.borrow_mut();
            if state.generation != self.generation {
                return;
            }
            state.inner = None;
            state.outer_done
        };
        if outer_done {
            self.downstream.complete();
        }
    }
}

pub(crate) fn switch_map<T, R>(source: Stream<T>, project: SwitchProjectFn<T, R>) -> Stream<R>
where
    T: 'static,
    R: 'static,
{
    Stream::create(move |downstream: Subscriber<R>| {
        let state: SharedState = Rc::default();

        let release = state.clone();
        downstream.add_teardown(move || {
            let inner = release.borrow_mut().inner.take();
            if let Some(inner) = inner {
                inner.unsubscribe();
            }
        });

        let observer = OuterObserver {
            downstream: downstream.clone(),
            project: project.clone(),
            state,
            index: 0,
        };
        subscribe_upstream(&source, downstream.subscription(), observer);
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;
    use crate::observer::Notification;
    use crate::operators::testing::{last, record, values};
    use crate::scheduler::{Scheduler, VirtualTimeScheduler};
    use crate::subject::Subject;

    fn project<T, R, F>(f: F) -> SwitchProjectFn<T, R>
    where
        F: Fn(T, usize) -> Stream<R> + 'static,
    {
        Rc::new(f)
    }

    #[test]
    fn test_synchronous_inners_are_concatenated() {
        let stream = switch_map(
            Stream::of(vec![1, 2]),
            project(|v: i32, _| Stream::of(vec![v * 10, v * 10 + 1])),
        );
        let (log, _) = record(&stream);
        assert_eq!(values(&log), vec![10, 11, 20, 21]);
        assert_eq!(last(&log), Some(Notification::Complete));
    }

    #[test]
    fn test_new_outer_value_cancels_previous_inner() {
        let outer = Subject::new();
        let inners: Vec<Subject<String>> = vec![Subject::new(), Subject::new()];
        let lookup = inners.clone();
        let stream = switch_map(
            outer.as_stream(),
            project(move |v: usize, _| match lookup.get(v) {
                Some(inner) => inner.as_stream(),
                None => Stream::empty(),
            }),
        );
        let (log, _) = record(&stream);

        outer.next(0);
        if let Some(first) = inners.first() {
            first.next("a".to_string());
        }
        outer.next(1);
        if let Some(first) = inners.first() {
            first.next("stale".to_string());
            assert_eq!(first.observer_count(), 0);
        }
        if let Some(second) = inners.get(1) {
            second.next("b".to_string());
        }

        assert_eq!(values(&log), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_completes_after_outer_and_active_inner() {
        let scheduler = VirtualTimeScheduler::new();
        let clock: Rc<dyn Scheduler> = Rc::new(scheduler.clone());
        let stream = switch_map(
            Stream::of(vec![1]),
            project(move |v: i32, _| {
                map_timer(Stream::timer(Duration::from_millis(10), clock.clone()), v)
            }),
        );
        let (log, _) = record(&stream);
        assert!(log.borrow().is_empty());

        scheduler.advance_by(Duration::from_millis(10));
        assert_eq!(
            *log.borrow(),
            vec![Notification::Next(1), Notification::Complete]
        );
    }

    fn map_timer(timer: Stream<()>, value: i32) -> Stream<i32> {
        let project = crate::operators::map::project_fn(move |_tick: (), _| value);
        crate::operators::map::map(timer, project)
    }

    #[test]
    fn test_unsubscribe_releases_inner() {
        let outer = Subject::new();
        let inner: Subject<i32> = Subject::new();
        let handle = inner.clone();
        let stream = switch_map(outer.as_stream(), project(move |_: i32, _| handle.as_stream()));
        let (_log, subscription) = record(&stream);

        outer.next(1);
        assert_eq!(inner.observer_count(), 1);
        subscription.unsubscribe();
        assert_eq!(inner.observer_count(), 0);
        assert_eq!(outer.observer_count(), 0);
    }

    #[test]
    fn test_inner_error_propagates() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let stream = switch_map(
            Stream::of(vec![1, 2]),
            project(move |_: i32, _| {
                counter.set(counter.get() + 1);
                Stream::<i32>::fail(StreamError::upstream("inner"))
            }),
        );
        let (log, _) = record(&stream);
        assert_eq!(
            *log.borrow(),
            vec![Notification::Error(StreamError::upstream("inner"))]
        );
        assert_eq!(calls.get(), 1);
    }
}
