//! Integration tests for typed-rx
//!
//! Exercises chains end to end through the public API.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use typed_rx::prelude::*;
use typed_rx_test_helpers::prelude::*;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn virtual_clock() -> (VirtualTimeScheduler, Rc<dyn Scheduler>) {
    let scheduler = VirtualTimeScheduler::new();
    let clock: Rc<dyn Scheduler> = Rc::new(scheduler.clone());
    (scheduler, clock)
}

mod chain_tests {
    use super::*;

    #[test]
    fn test_steps_follow_applied_operators() {
        let (_scheduler, clock) = virtual_clock();
        let chain = Chain::new(Stream::of(vec![1, 2, 3]))
            .call(ops::start_with(vec![0]))
            .call(ops::map(|v: i32, _| v.to_string()))
            .call(must(ops::debounce_time(ms(10), clock)))
            .call(ops::share());

        assert_eq!(
            chain.steps(),
            &[
                OperatorKind::StartWith,
                OperatorKind::Map,
                OperatorKind::DebounceTime,
                OperatorKind::Share
            ]
        );
    }

    #[test]
    fn test_map_then_filter_changes_element_type() {
        let recorder = Recorder::new();
        Chain::new(Stream::of(vec!["a", "bb", "ccc"]))
            .call(ops::map(|s: &str, _| s.len()))
            .call(ops::filter(|n: &usize, _| *n > 1))
            .subscribe_with(recorder.clone());

        assert_eq!(recorder.values(), vec![2, 3]);
        assert!(recorder.is_completed());
    }

    #[test]
    fn test_zero_duration_rejected_before_chain_exists() {
        let (_scheduler, clock) = virtual_clock();
        let err = must_err(ops::debounce_time::<i32>(Duration::ZERO, clock.clone()));
        assert_eq!(
            err.to_string(),
            "Invalid argument for debounce_time: duration must be greater than zero"
        );
        assert!(ops::audit_time::<i32>(Duration::ZERO, clock).is_err());
    }

    #[test]
    fn test_result_can_be_rewrapped() {
        let stream = Chain::new(Stream::of(vec![1, 2]))
            .call(ops::map(|v: i32, _| v + 1))
            .result();

        let recorder = Recorder::new();
        Chain::from(stream)
            .call(ops::map(|v: i32, _| v * 10))
            .subscribe_with(recorder.clone());
        assert_eq!(recorder.values(), vec![20, 30]);
    }
}

mod first_tests {
    use super::*;

    #[test]
    fn test_first_cancels_upstream_after_match() {
        let probe = ProducerProbe::new();
        let recorder = Recorder::new();
        let subscription = Chain::new(probe.wrap(Stream::of(vec![3, 1, 4])))
            .call(ops::first())
            .subscribe_with(recorder.clone());

        assert_eq!(
            recorder.notifications(),
            vec![Notification::Next(3), Notification::Complete]
        );
        assert_eq!(probe.emitted(), 1);
        assert_eq!(probe.teardowns(), 1);
        assert!(subscription.is_closed());
    }

    #[test]
    fn test_first_on_empty_fails() {
        let recorder = Recorder::new();
        Chain::new(Stream::<i32>::empty())
            .call(ops::first())
            .subscribe_with(recorder.clone());
        assert_eq!(recorder.error(), Some(StreamError::EmptySequence));
    }

    #[test]
    fn test_first_or_default_on_empty() {
        let recorder = Recorder::new();
        Chain::new(Stream::<i32>::empty())
            .call(ops::first_or(42))
            .subscribe_with(recorder.clone());
        assert_eq!(
            recorder.notifications(),
            vec![Notification::Next(42), Notification::Complete]
        );
    }

    #[test]
    fn test_first_where_or_without_match() {
        let recorder = Recorder::new();
        Chain::new(Stream::of(vec![1, 3, 5]))
            .call(ops::first_where_or(|v: &i32| v % 2 == 0, -1))
            .subscribe_with(recorder.clone());
        assert_eq!(recorder.values(), vec![-1]);
    }
}

mod timing_tests {
    use super::*;

    #[test]
    fn test_debounce_emits_last_value_once_quiet() {
        let (scheduler, clock) = virtual_clock();
        let input = Subject::new();
        let recorder = Recorder::with_clock(clock.clone());
        Chain::new(input.as_stream())
            .call(must(ops::debounce_time(ms(100), clock)))
            .subscribe_with(recorder.clone());

        input.next('a');
        scheduler.advance_to(ms(50));
        input.next('b');
        scheduler.advance_to(ms(60));
        input.next('c');
        scheduler.advance_to(ms(1000));

        assert_eq!(recorder.timed_values(), vec![(ms(160), 'c')]);
    }

    #[test]
    fn test_audit_emits_at_window_cadence() {
        let (scheduler, clock) = virtual_clock();
        let recorder = Recorder::with_clock(clock.clone());
        let subscription = Chain::new(Stream::interval(ms(10), clock.clone()))
            .call(must(ops::audit_time(ms(25), clock)))
            .subscribe_with(recorder.clone());

        scheduler.advance_to(ms(100));
        subscription.unsubscribe();

        // Ticks at 10, 20, ...; windows open at 10, 40, 70 and close 25ms later
        assert_eq!(
            recorder.timed_values(),
            vec![(ms(35), 2), (ms(65), 5), (ms(95), 8)]
        );
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_audit_completion_mid_window_emits_nothing() {
        let (scheduler, clock) = virtual_clock();
        let input = Subject::new();
        let recorder = Recorder::with_clock(clock.clone());
        Chain::new(input.as_stream())
            .call(must(ops::audit_time(ms(100), clock)))
            .subscribe_with(recorder.clone());

        input.next(5);
        scheduler.advance_to(ms(10));
        input.complete();
        scheduler.advance_to(ms(500));

        assert!(recorder.timed_values().is_empty());
        assert!(recorder.is_completed());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_take_until_timer() {
        let (scheduler, clock) = virtual_clock();
        let recorder = Recorder::new();
        Chain::new(Stream::interval(ms(10), clock.clone()))
            .call(ops::take_until(Stream::timer(ms(35), clock)))
            .subscribe_with(recorder.clone());

        scheduler.advance_to(ms(200));
        assert_eq!(recorder.values(), vec![0, 1, 2]);
        assert!(recorder.is_completed());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_take_until_with_signal_of_any_stream() {
        let input = Subject::new();
        let stop: Subject<String> = Subject::new();
        let recorder = Recorder::new();
        Chain::new(input.as_stream())
            .call(ops::take_until(stop.as_stream().signal()))
            .subscribe_with(recorder.clone());

        input.next(1);
        stop.next("halt".to_string());
        input.next(2);

        assert_eq!(recorder.values(), vec![1]);
        assert_eq!(stop.observer_count(), 0);
    }
}

mod share_tests {
    use super::*;

    #[test]
    fn test_share_invokes_producer_once() {
        let input = Subject::new();
        let probe = ProducerProbe::new();
        let shared = Chain::new(probe.wrap(input.as_stream())).call(ops::share());

        let first = Recorder::new();
        let second = Recorder::new();
        shared.subscribe_with(first.clone());
        shared.subscribe_with(second.clone());
        input.next(1);
        input.next(2);
        input.complete();

        assert_eq!(probe.subscriptions(), 1);
        assert_eq!(first.values(), vec![1, 2]);
        assert_eq!(second.values(), vec![1, 2]);
        assert!(first.is_completed() && second.is_completed());
    }

    #[test]
    fn test_share_disconnects_with_last_subscriber() {
        let probe = ProducerProbe::new();
        let shared = Chain::new(probe.wrap(Stream::<i32>::never())).call(ops::share());

        let a = shared.subscribe(|_| {});
        let b = shared.subscribe(|_| {});
        a.unsubscribe();
        assert_eq!(probe.teardowns(), 0);
        b.unsubscribe();
        assert_eq!(probe.teardowns(), 1);

        shared.subscribe(|_| {});
        assert_eq!(probe.subscriptions(), 2);
    }

    #[test]
    fn test_share_with_keeps_connection() {
        let probe = ProducerProbe::new();
        let shared = Chain::new(probe.wrap(Stream::<i32>::never())).call(ops::share_with(ShareArgs {
            reset_on_ref_count_zero: false,
        }));

        shared.subscribe(|_| {}).unsubscribe();
        shared.subscribe(|_| {});
        assert_eq!(probe.subscriptions(), 1);
        assert_eq!(probe.teardowns(), 0);
    }

    #[test]
    fn test_share_default_follows_config() -> TestResult {
        typed_rx::config::install(ChainConfig::default().share_reset_on_ref_count_zero(false))?;
        let probe = ProducerProbe::new();
        let shared = Chain::new(probe.wrap(Stream::<i32>::never())).call(ops::share());

        shared.subscribe(|_| {}).unsubscribe();
        assert_eq!(probe.teardowns(), 0);

        typed_rx::config::install(ChainConfig::default())?;
        Ok(())
    }
}

mod recovery_tests {
    use super::*;

    fn failing_after(values: Vec<i32>) -> Stream<i32> {
        Stream::create(move |subscriber: Subscriber<i32>| {
            for value in values.iter().copied() {
                subscriber.next(value);
            }
            subscriber.error(StreamError::upstream("connection reset"));
        })
    }

    #[test]
    fn test_catch_error_continues_with_recovery() {
        let recorder = Recorder::new();
        Chain::new(failing_after(vec![1, 2]))
            .call(ops::catch_error(|_err, _caught| Stream::of(vec![9, 10])))
            .subscribe_with(recorder.clone());

        assert_eq!(
            recorder.notifications(),
            vec![
                Notification::Next(1),
                Notification::Next(2),
                Notification::Next(9),
                Notification::Next(10),
                Notification::Complete
            ]
        );
        assert_eq!(recorder.error(), None);
    }

    #[test]
    fn test_error_skips_steps_until_catch() {
        let mapped = CallCounter::new();
        let counter = mapped.clone();
        let recorder = Recorder::new();
        Chain::new(failing_after(vec![]))
            .call(ops::map(move |v: i32, _| {
                counter.hit();
                v
            }))
            .call(ops::catch_error(|err, _| {
                Stream::of(vec![err.to_string().len() as i32])
            }))
            .subscribe_with(recorder.clone());

        assert_eq!(mapped.count(), 0);
        assert_eq!(recorder.values(), vec!["Upstream failed: connection reset".len() as i32]);
    }

    #[test]
    fn test_unhandled_error_is_collected() -> TestResult {
        typed_rx::config::install(
            ChainConfig::default().unhandled_errors(UnhandledErrorPolicy::Collect),
        )?;
        Chain::new(failing_after(vec![1])).subscribe(|_| {});
        assert_eq!(
            typed_rx::config::take_unhandled_errors(),
            vec![StreamError::upstream("connection reset")]
        );
        typed_rx::config::install(ChainConfig::default())?;
        Ok(())
    }
}

mod finalize_tests {
    use super::*;

    #[test]
    fn test_finalize_once_on_complete() {
        let cleanups = CallCounter::new();
        let subscription = Chain::new(Stream::of(vec![1]))
            .call(ops::finalize(cleanups.callback()))
            .subscribe(|_| {});
        subscription.unsubscribe();
        assert_eq!(cleanups.count(), 1);
    }

    #[test]
    fn test_finalize_once_on_error() {
        let cleanups = CallCounter::new();
        Chain::new(Stream::<i32>::fail(StreamError::upstream("x")))
            .call(ops::finalize(cleanups.callback()))
            .subscribe_all(|_| {}, |_| {}, || {});
        assert_eq!(cleanups.count(), 1);
    }

    #[test]
    fn test_finalize_once_on_early_unsubscribe() {
        let (scheduler, clock) = virtual_clock();
        let cleanups = CallCounter::new();
        let subscription = Chain::new(Stream::interval(ms(10), clock))
            .call(ops::finalize(cleanups.callback()))
            .subscribe(|_| {});

        scheduler.advance_by(ms(25));
        subscription.unsubscribe();
        subscription.unsubscribe();
        scheduler.advance_by(ms(100));
        assert_eq!(cleanups.count(), 1);
    }

    #[test]
    fn test_finalize_runs_after_terminal_event() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let (on_complete, on_cleanup) = (order.clone(), order.clone());
        Chain::new(Stream::of(vec![1]))
            .call(ops::finalize(move || on_cleanup.borrow_mut().push("cleanup")))
            .subscribe_all(
                |_| {},
                |_| {},
                move || on_complete.borrow_mut().push("complete"),
            );
        assert_eq!(*order.borrow(), vec!["complete", "cleanup"]);
    }

    #[test]
    fn test_try_finalize_failure_reported() -> TestResult {
        typed_rx::config::install(
            ChainConfig::default().unhandled_errors(UnhandledErrorPolicy::Collect),
        )?;
        let recorder = Recorder::new();
        Chain::new(Stream::of(vec![1]))
            .call(ops::try_finalize(|| Err(StreamError::upstream("flush failed"))))
            .subscribe_with(recorder.clone());

        assert!(recorder.is_completed());
        let reported = typed_rx::config::take_unhandled_errors();
        assert_eq!(reported.len(), 1);
        assert!(reported.iter().all(StreamError::is_cleanup));
        typed_rx::config::install(ChainConfig::default())?;
        Ok(())
    }
}

mod switch_tests {
    use super::*;

    #[test]
    fn test_switch_map_follows_latest_timer() {
        let (scheduler, clock) = virtual_clock();
        let input = Subject::new();
        let recorder = Recorder::with_clock(clock.clone());
        Chain::new(input.as_stream())
            .call(ops::switch_map(move |delay: u64, _| {
                Chain::new(Stream::timer(ms(delay), clock.clone()))
                    .call(ops::map(move |_tick: (), _| delay))
                    .result()
            }))
            .subscribe_with(recorder.clone());

        input.next(50);
        scheduler.advance_to(ms(20));
        input.next(10);
        scheduler.advance_to(ms(200));

        assert_eq!(recorder.timed_values(), vec![(ms(30), 10)]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_tap_and_start_with_compose() {
        let tapped = Rc::new(RefCell::new(Vec::new()));
        let sink = tapped.clone();
        let recorder = Recorder::new();
        Chain::new(Stream::of(vec![2, 3]))
            .call(ops::start_with(vec![1]))
            .call(ops::tap(move |v: &i32| sink.borrow_mut().push(*v)))
            .subscribe_with(recorder.clone());

        assert_eq!(*tapped.borrow(), vec![1, 2, 3]);
        assert_eq!(recorder.values(), vec![1, 2, 3]);
    }
}

mod reentrancy_tests {
    use std::cell::Cell;

    use super::*;

    type ChainSlot = Rc<RefCell<Option<Chain<i32>>>>;

    fn subscribe_from_slot(slot: &ChainSlot, recorder: &Recorder<i32>) {
        let chain = slot.borrow().clone();
        if let Some(chain) = chain {
            chain.subscribe_with(recorder.clone());
        }
    }

    #[test]
    fn test_cleanup_cancels_sibling_subscription() {
        let input: Subject<i32> = Subject::new();
        let sibling: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let cleanups = CallCounter::new();
        let (target, counter) = (sibling.clone(), cleanups.clone());
        let cancel_sibling = ops::finalize(move || {
            counter.hit();
            let other = target.borrow_mut().take();
            if let Some(other) = other {
                other.unsubscribe();
            }
        });
        let chain = Chain::new(input.as_stream()).call(cancel_sibling);

        let first = chain.subscribe(|_| {});
        let second = chain.subscribe(|_| {});
        *sibling.borrow_mut() = Some(second.clone());
        first.unsubscribe();

        assert!(first.is_closed());
        assert!(second.is_closed());
        assert_eq!(cleanups.count(), 2);
        assert_eq!(input.observer_count(), 0);
    }

    #[test]
    fn test_tap_callback_subscribes_same_chain() {
        let slot: ChainSlot = Rc::new(RefCell::new(None));
        let nested = Recorder::new();
        let started = Rc::new(Cell::new(false));
        let (target, inner) = (slot.clone(), nested.clone());
        let resubscribe = ops::tap(move |_: &i32| {
            if !started.replace(true) {
                subscribe_from_slot(&target, &inner);
            }
        });
        let chain = Chain::new(Stream::of(vec![1, 2])).call(resubscribe);
        *slot.borrow_mut() = Some(chain.clone());

        let outer = Recorder::new();
        chain.subscribe_with(outer.clone());
        slot.borrow_mut().take();

        assert_eq!(outer.values(), vec![1, 2]);
        assert!(outer.is_completed());
        assert_eq!(nested.values(), vec![1, 2]);
        assert!(nested.is_completed());
    }

    #[test]
    fn test_projection_subscribes_same_chain() {
        let slot: ChainSlot = Rc::new(RefCell::new(None));
        let nested = Recorder::new();
        let started = Rc::new(Cell::new(false));
        let (target, inner) = (slot.clone(), nested.clone());
        let resubscribe = ops::map(move |v: i32, _| {
            if !started.replace(true) {
                subscribe_from_slot(&target, &inner);
            }
            v * 10
        });
        let chain = Chain::new(Stream::of(vec![1, 2])).call(resubscribe);
        *slot.borrow_mut() = Some(chain.clone());

        let outer = Recorder::new();
        chain.subscribe_with(outer.clone());
        slot.borrow_mut().take();

        assert_eq!(outer.values(), vec![10, 20]);
        assert_eq!(nested.values(), vec![10, 20]);
    }
}
