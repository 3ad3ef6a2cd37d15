//! Operator constructors
//!
//! The only way to build an [`Operator`]. Each constructor takes exactly the
//! arguments its operator needs; type-preserving operators are built as
//! `Operator<T, T>`.
//!
//! ```
//! use typed_rx::{Chain, Stream, ops};
//!
//! let chain = Chain::new(Stream::of(vec![1, 2, 3, 4]))
//!     .call(ops::filter(|v: &i32, _| v % 2 == 0))
//!     .call(ops::map(|v: i32, _| v.to_string()));
//! assert_eq!(chain.len(), 2);
//! ```

use std::rc::Rc;
use std::time::Duration;

use crate::error::{ChainError, ChainResult, StreamError};
use crate::operator::{FirstArgs, Operator, OperatorKind, Same, ShareArgs, TapArgs, TimingArgs};
use crate::scheduler::Scheduler;
use crate::stream::Stream;

fn validate_positive_duration(kind: OperatorKind, value: Duration) -> ChainResult<Duration> {
    if value.is_zero() {
        return Err(ChainError::invalid_argument(
            kind.name(),
            "duration must be greater than zero",
        ));
    }
    Ok(value)
}

/// Project each value and its index to a new value
pub fn map<T, R, F>(project: F) -> Operator<T, R>
where
    F: Fn(T, usize) -> R + 'static,
{
    Operator::Map {
        project: Rc::new(project),
    }
}

/// Keep values for which `predicate(&value, index)` holds
pub fn filter<T, F>(predicate: F) -> Operator<T, T>
where
    F: Fn(&T, usize) -> bool + 'static,
{
    Operator::Filter {
        predicate: Rc::new(predicate),
        same: Same::new(),
    }
}

/// Project each value to an inner stream and follow only the latest one
pub fn switch_map<T, R, F>(project: F) -> Operator<T, R>
where
    F: Fn(T, usize) -> Stream<R> + 'static,
{
    Operator::SwitchMap {
        project: Rc::new(project),
    }
}

/// Replace an upstream failure with the stream returned by `selector`.
///
/// The selector receives the error and the caught stream; returning the
/// caught stream resubscribes the source.
pub fn catch_error<T, F>(selector: F) -> Operator<T, T>
where
    F: Fn(StreamError, Stream<T>) -> Stream<T> + 'static,
{
    Operator::CatchError {
        selector: Rc::new(selector),
        same: Same::new(),
    }
}

/// Observe each value without altering it
pub fn tap<T, F>(on_next: F) -> Operator<T, T>
where
    F: Fn(&T) + 'static,
{
    tap_with(TapArgs::new().on_next(on_next))
}

/// Observe values, errors and completion without altering them
pub fn tap_with<T>(args: TapArgs<T>) -> Operator<T, T> {
    Operator::Tap {
        args: Rc::new(args),
        same: Same::new(),
    }
}

/// Emit the first value, then complete.
///
/// Completing without a value fails with [`StreamError::EmptySequence`].
pub fn first<T>() -> Operator<T, T> {
    Operator::First {
        args: Rc::new(FirstArgs {
            predicate: None,
            default: None,
        }),
        same: Same::new(),
    }
}

/// Emit the first value matching `predicate`, then complete
pub fn first_where<T, F>(predicate: F) -> Operator<T, T>
where
    F: Fn(&T) -> bool + 'static,
{
    Operator::First {
        args: Rc::new(FirstArgs {
            predicate: Some(Rc::new(predicate)),
            default: None,
        }),
        same: Same::new(),
    }
}

/// Emit the first value, or `default` if the source completes empty
pub fn first_or<T>(default: T) -> Operator<T, T> {
    Operator::First {
        args: Rc::new(FirstArgs {
            predicate: None,
            default: Some(default),
        }),
        same: Same::new(),
    }
}

/// Emit the first value matching `predicate`, or `default` if none matches
pub fn first_where_or<T, F>(predicate: F, default: T) -> Operator<T, T>
where
    F: Fn(&T) -> bool + 'static,
{
    Operator::First {
        args: Rc::new(FirstArgs {
            predicate: Some(Rc::new(predicate)),
            default: Some(default),
        }),
        same: Same::new(),
    }
}

/// Emit `values` before relaying the source
pub fn start_with<T>(values: Vec<T>) -> Operator<T, T> {
    Operator::StartWith {
        values: Rc::new(values),
        same: Same::new(),
    }
}

/// Emit a value only after `due` has passed without another value.
///
/// # Errors
///
/// Returns [`ChainError::InvalidArgument`] if `due` is zero.
pub fn debounce_time<T>(
    due: Duration,
    scheduler: Rc<dyn Scheduler>,
) -> ChainResult<Operator<T, T>> {
    let duration = validate_positive_duration(OperatorKind::DebounceTime, due)?;
    Ok(Operator::DebounceTime {
        timing: TimingArgs {
            duration,
            scheduler,
        },
        same: Same::new(),
    })
}

/// Emit the most recent value at the end of each `duration` window.
///
/// # Errors
///
/// Returns [`ChainError::InvalidArgument`] if `duration` is zero.
pub fn audit_time<T>(
    duration: Duration,
    scheduler: Rc<dyn Scheduler>,
) -> ChainResult<Operator<T, T>> {
    let duration = validate_positive_duration(OperatorKind::AuditTime, duration)?;
    Ok(Operator::AuditTime {
        timing: TimingArgs {
            duration,
            scheduler,
        },
        same: Same::new(),
    })
}

/// Complete as soon as `notifier` emits.
///
/// Any stream can be turned into a notifier with [`Stream::signal`].
pub fn take_until<T>(notifier: Stream<()>) -> Operator<T, T> {
    Operator::TakeUntil {
        notifier,
        same: Same::new(),
    }
}

/// Multicast one source execution to all concurrent subscribers.
///
/// Uses the ref-count reset default from the active [`ChainConfig`](crate::ChainConfig).
pub fn share<T>() -> Operator<T, T> {
    share_with(ShareArgs::default())
}

/// [`share`] with explicit arguments
pub fn share_with<T>(args: ShareArgs) -> Operator<T, T> {
    Operator::Share {
        args,
        same: Same::new(),
    }
}

/// Run `action` once when a subscription completes, fails or is canceled
pub fn finalize<T, F>(action: F) -> Operator<T, T>
where
    F: Fn() + 'static,
{
    try_finalize(move || {
        action();
        Ok(())
    })
}

/// [`finalize`] with a fallible action.
///
/// A failure is reported on the unhandled-error channel as
/// [`StreamError::Cleanup`]; the subscriber never sees it.
pub fn try_finalize<T, F>(action: F) -> Operator<T, T>
where
    F: Fn() -> Result<(), StreamError> + 'static,
{
    Operator::Finalize {
        action: Rc::new(action),
        same: Same::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::VirtualTimeScheduler;

    fn clock() -> Rc<dyn Scheduler> {
        Rc::new(VirtualTimeScheduler::new())
    }

    #[test]
    fn test_zero_duration_rejected() {
        let debounce = debounce_time::<i32>(Duration::ZERO, clock());
        assert!(matches!(
            debounce,
            Err(ChainError::InvalidArgument {
                operator: "debounce_time",
                ..
            })
        ));

        let audit = audit_time::<i32>(Duration::ZERO, clock());
        assert!(matches!(
            audit,
            Err(ChainError::InvalidArgument {
                operator: "audit_time",
                ..
            })
        ));
    }

    #[test]
    fn test_constructors_tag_kind() -> ChainResult<()> {
        let kinds = [
            map(|v: i32, _| v).kind(),
            filter(|_: &i32, _| true).kind(),
            switch_map(|v: i32, _| Stream::of(vec![v])).kind(),
            catch_error(|_, caught: Stream<i32>| caught).kind(),
            tap(|_: &i32| {}).kind(),
            first::<i32>().kind(),
            start_with(vec![1]).kind(),
            debounce_time::<i32>(Duration::from_millis(1), clock())?.kind(),
            audit_time::<i32>(Duration::from_millis(1), clock())?.kind(),
            take_until::<i32>(Stream::never()).kind(),
            share::<i32>().kind(),
            finalize::<i32, _>(|| {}).kind(),
        ];
        assert_eq!(kinds, OperatorKind::ALL);
        Ok(())
    }

    #[test]
    fn test_first_variants_share_kind() {
        assert_eq!(first_or(0).kind(), OperatorKind::First);
        assert_eq!(first_where(|v: &i32| *v > 0).kind(), OperatorKind::First);
        assert_eq!(first_where_or(|v: &i32| *v > 0, 0).kind(), OperatorKind::First);
    }
}
