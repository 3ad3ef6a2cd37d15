//! `map`

use std::rc::Rc;

use super::subscribe_upstream;
use crate::error::StreamError;
use crate::observer::{Observer, Subscriber};
use crate::operator::ProjectFn;
use crate::stream::Stream;

pub(crate) fn project_fn<T, R, F>(project: F) -> ProjectFn<T, R>
where
    F: Fn(T, usize) -> R + 'static,
{
    Rc::new(project)
}

struct MapObserver<T, R> {
    downstream: Subscriber<R>,
    project: ProjectFn<T, R>,
    index: usize,
}

impl<T, R: 'static> Observer<T> for MapObserver<T, R> {
    fn next(&mut self, value: T) {
        let index = self.index;
        self.index = self.index.wrapping_add(1);
        let mapped = (self.project)(value, index);
        self.downstream.next(mapped);
    }

    fn error(&mut self, err: StreamError) {
        self.downstream.error(err);
    }

    fn complete(&mut self) {
        self.downstream.complete();
    }
}

pub(crate) fn map<T, R>(source: Stream<T>, project: ProjectFn<T, R>) -> Stream<R>
where
    T: 'static,
    R: 'static,
{
    Stream::create(move |downstream: Subscriber<R>| {
        let observer = MapObserver {
            downstream: downstream.clone(),
            project: project.clone(),
            index: 0,
        };
        subscribe_upstream(&source, downstream.subscription(), observer);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::Notification;
    use crate::operators::testing::{last, record, values};

    #[test]
    fn test_map_passes_index() {
        let stream = map(
            Stream::of(vec!['a', 'b', 'c']),
            project_fn(|c: char, i| format!("{c}{i}")),
        );
        let (log, _) = record(&stream);
        assert_eq!(values(&log), vec!["a0", "b1", "c2"]);
        assert_eq!(last(&log), Some(Notification::Complete));
    }

    #[test]
    fn test_index_restarts_per_subscription() {
        let stream = map(Stream::of(vec![5, 5]), project_fn(|_: i32, i| i));
        let (first, _) = record(&stream);
        let (second, _) = record(&stream);
        assert_eq!(values(&first), vec![0, 1]);
        assert_eq!(values(&second), vec![0, 1]);
    }

    #[test]
    fn test_error_passes_through() {
        let stream = map(
            Stream::<i32>::fail(StreamError::upstream("down")),
            project_fn(|v: i32, _| v + 1),
        );
        let (log, _) = record(&stream);
        assert_eq!(
            *log.borrow(),
            vec![Notification::Error(StreamError::upstream("down"))]
        );
    }
}
