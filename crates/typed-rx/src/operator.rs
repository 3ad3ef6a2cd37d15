//! The closed operator set
//!
//! Every supported transformation has:
//! - an [`OperatorKind`] tag and a static [`OperatorDescriptor`]
//! - a variant of [`Operator<T, R>`] carrying its typed arguments
//! - a constructor in [`crate::ops`]
//!
//! Operators that keep the element type carry a [`Same<T, R>`] proof. The
//! proof can only be created for `R = T`, so a preserving operator can never
//! be applied as if it changed the element type.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::error::StreamError;
use crate::scheduler::Scheduler;
use crate::stream::Stream;

/// Tag for each operator in the closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// Project each value through a function
    Map,
    /// Suppress values failing a predicate
    Filter,
    /// Map to inner streams, following only the latest
    SwitchMap,
    /// Replace a failed upstream with a recovery stream
    CatchError,
    /// Observe events without altering them
    Tap,
    /// Take the first (matching) value and complete
    First,
    /// Emit a fixed prefix before upstream values
    StartWith,
    /// Emit after a quiet period
    DebounceTime,
    /// Emit the latest value at the end of each audit window
    AuditTime,
    /// Complete when a notifier emits
    TakeUntil,
    /// Multicast one upstream execution
    Share,
    /// Run a cleanup action on every exit path
    Finalize,
}

impl OperatorKind {
    /// Every kind, in catalog order
    pub const ALL: [OperatorKind; 12] = [
        OperatorKind::Map,
        OperatorKind::Filter,
        OperatorKind::SwitchMap,
        OperatorKind::CatchError,
        OperatorKind::Tap,
        OperatorKind::First,
        OperatorKind::StartWith,
        OperatorKind::DebounceTime,
        OperatorKind::AuditTime,
        OperatorKind::TakeUntil,
        OperatorKind::Share,
        OperatorKind::Finalize,
    ];

    /// Static description of this kind
    #[must_use]
    pub fn descriptor(self) -> &'static OperatorDescriptor {
        match self {
            OperatorKind::Map => &MAP,
            OperatorKind::Filter => &FILTER,
            OperatorKind::SwitchMap => &SWITCH_MAP,
            OperatorKind::CatchError => &CATCH_ERROR,
            OperatorKind::Tap => &TAP,
            OperatorKind::First => &FIRST,
            OperatorKind::StartWith => &START_WITH,
            OperatorKind::DebounceTime => &DEBOUNCE_TIME,
            OperatorKind::AuditTime => &AUDIT_TIME,
            OperatorKind::TakeUntil => &TAKE_UNTIL,
            OperatorKind::Share => &SHARE,
            OperatorKind::Finalize => &FINALIZE,
        }
    }

    /// Stable operator name
    #[must_use]
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an operator relates its input and output element types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementShape {
    /// Output element type equals the input element type
    Preserving,
    /// Output element type is chosen by the caller
    Transforming,
}

/// Immutable description of one operator kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorDescriptor {
    /// Operator tag
    pub kind: OperatorKind,
    /// Stable operator name
    pub name: &'static str,
    /// Input/output element type relationship
    pub shape: ElementShape,
    /// Argument names in order
    pub arguments: &'static [&'static str],
    /// Whether the operator needs a scheduler
    pub timed: bool,
    /// One-line behavior summary
    pub summary: &'static str,
}

const MAP: OperatorDescriptor = OperatorDescriptor {
    kind: OperatorKind::Map,
    name: "map",
    shape: ElementShape::Transforming,
    arguments: &["project"],
    timed: false,
    summary: "projects each value, one output per input",
};

const FILTER: OperatorDescriptor = OperatorDescriptor {
    kind: OperatorKind::Filter,
    name: "filter",
    shape: ElementShape::Preserving,
    arguments: &["predicate"],
    timed: false,
    summary: "suppresses values failing the predicate",
};

const SWITCH_MAP: OperatorDescriptor = OperatorDescriptor {
    kind: OperatorKind::SwitchMap,
    name: "switch_map",
    shape: ElementShape::Transforming,
    arguments: &["project"],
    timed: false,
    summary: "follows the inner stream of the latest value",
};

const CATCH_ERROR: OperatorDescriptor = OperatorDescriptor {
    kind: OperatorKind::CatchError,
    name: "catch_error",
    shape: ElementShape::Preserving,
    arguments: &["selector"],
    timed: false,
    summary: "switches to a recovery stream on upstream failure",
};

const TAP: OperatorDescriptor = OperatorDescriptor {
    kind: OperatorKind::Tap,
    name: "tap",
    shape: ElementShape::Preserving,
    arguments: &["next", "error", "complete"],
    timed: false,
    summary: "observes events without altering them",
};

const FIRST: OperatorDescriptor = OperatorDescriptor {
    kind: OperatorKind::First,
    name: "first",
    shape: ElementShape::Preserving,
    arguments: &["predicate", "default"],
    timed: false,
    summary: "emits the first matching value then completes",
};

const START_WITH: OperatorDescriptor = OperatorDescriptor {
    kind: OperatorKind::StartWith,
    name: "start_with",
    shape: ElementShape::Preserving,
    arguments: &["values"],
    timed: false,
    summary: "emits a fixed prefix before upstream values",
};

const DEBOUNCE_TIME: OperatorDescriptor = OperatorDescriptor {
    kind: OperatorKind::DebounceTime,
    name: "debounce_time",
    shape: ElementShape::Preserving,
    arguments: &["due", "scheduler"],
    timed: true,
    summary: "emits a value after a quiet period",
};

const AUDIT_TIME: OperatorDescriptor = OperatorDescriptor {
    kind: OperatorKind::AuditTime,
    name: "audit_time",
    shape: ElementShape::Preserving,
    arguments: &["duration", "scheduler"],
    timed: true,
    summary: "emits the latest value at the end of each window",
};

const TAKE_UNTIL: OperatorDescriptor = OperatorDescriptor {
    kind: OperatorKind::TakeUntil,
    name: "take_until",
    shape: ElementShape::Preserving,
    arguments: &["notifier"],
    timed: false,
    summary: "completes when the notifier emits",
};

const SHARE: OperatorDescriptor = OperatorDescriptor {
    kind: OperatorKind::Share,
    name: "share",
    shape: ElementShape::Preserving,
    arguments: &[],
    timed: false,
    summary: "multicasts one upstream execution",
};

const FINALIZE: OperatorDescriptor = OperatorDescriptor {
    kind: OperatorKind::Finalize,
    name: "finalize",
    shape: ElementShape::Preserving,
    arguments: &["action"],
    timed: false,
    summary: "runs a cleanup action once on any exit",
};

/// All operator descriptors, in [`OperatorKind::ALL`] order
pub const CATALOG: &[OperatorDescriptor] = &[
    MAP,
    FILTER,
    SWITCH_MAP,
    CATCH_ERROR,
    TAP,
    FIRST,
    START_WITH,
    DEBOUNCE_TIME,
    AUDIT_TIME,
    TAKE_UNTIL,
    SHARE,
    FINALIZE,
];

/// All operator descriptors
#[must_use]
pub fn catalog() -> &'static [OperatorDescriptor] {
    CATALOG
}

/// Look up a descriptor by operator name
#[must_use]
pub fn lookup(name: &str) -> Option<&'static OperatorDescriptor> {
    CATALOG.iter().find(|descriptor| descriptor.name == name)
}

/// Proof that `T` and `R` are the same type
///
/// Only constructible inside the crate for `Same<T, T>`.
pub struct Same<T, R> {
    cast: fn(Stream<T>) -> Stream<R>,
}

fn identity<T>(stream: Stream<T>) -> Stream<T> {
    stream
}

impl<T> Same<T, T> {
    pub(crate) fn new() -> Self {
        Self { cast: identity }
    }
}

impl<T, R> Same<T, R> {
    pub(crate) fn cast(&self, stream: Stream<T>) -> Stream<R> {
        (self.cast)(stream)
    }
}

impl<T, R> Clone for Same<T, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, R> Copy for Same<T, R> {}

impl<T, R> fmt::Debug for Same<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Same")
    }
}

/// Projection `(value, index) -> R`
pub type ProjectFn<T, R> = Rc<dyn Fn(T, usize) -> R>;
/// Predicate `(&value, index) -> bool`
pub type PredicateFn<T> = Rc<dyn Fn(&T, usize) -> bool>;
/// Inner stream projection `(value, index) -> Stream<R>`
pub type SwitchProjectFn<T, R> = Rc<dyn Fn(T, usize) -> Stream<R>>;
/// Recovery selector `(error, caught) -> Stream<T>`
pub type SelectorFn<T> = Rc<dyn Fn(StreamError, Stream<T>) -> Stream<T>>;
/// Cleanup action
pub type CleanupFn = Rc<dyn Fn() -> Result<(), StreamError>>;

/// Callbacks for `tap`
pub struct TapArgs<T> {
    pub(crate) on_next: Option<Rc<dyn Fn(&T)>>,
    pub(crate) on_error: Option<Rc<dyn Fn(&StreamError)>>,
    pub(crate) on_complete: Option<Rc<dyn Fn()>>,
}

impl<T> TapArgs<T> {
    /// No callbacks
    #[must_use]
    pub fn new() -> Self {
        Self {
            on_next: None,
            on_error: None,
            on_complete: None,
        }
    }

    /// Called with each value
    #[must_use]
    pub fn on_next<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) + 'static,
    {
        self.on_next = Some(Rc::new(f));
        self
    }

    /// Called with the error
    #[must_use]
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&StreamError) + 'static,
    {
        self.on_error = Some(Rc::new(f));
        self
    }

    /// Called on completion
    #[must_use]
    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.on_complete = Some(Rc::new(f));
        self
    }
}

impl<T> Default for TapArgs<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TapArgs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapArgs")
            .field("on_next", &self.on_next.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Arguments for `first`
pub struct FirstArgs<T> {
    pub(crate) predicate: Option<Rc<dyn Fn(&T) -> bool>>,
    pub(crate) default: Option<T>,
}

impl<T> fmt::Debug for FirstArgs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirstArgs")
            .field("predicate", &self.predicate.is_some())
            .field("default", &self.default.is_some())
            .finish()
    }
}

/// Arguments for timed operators
#[derive(Clone)]
pub struct TimingArgs {
    pub(crate) duration: Duration,
    pub(crate) scheduler: Rc<dyn Scheduler>,
}

impl TimingArgs {
    /// Window or quiet-period length
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Debug for TimingArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimingArgs")
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

/// Arguments for `share`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareArgs {
    /// Disconnect from the source when the last subscriber leaves
    pub reset_on_ref_count_zero: bool,
}

impl Default for ShareArgs {
    fn default() -> Self {
        Self {
            reset_on_ref_count_zero: crate::config::current().share_reset_on_ref_count_zero,
        }
    }
}

/// One operator application, typed from `T` to `R`
///
/// Built with the constructors in [`crate::ops`] and applied with
/// [`Chain::call`](crate::Chain::call).
pub enum Operator<T, R> {
    /// `map`
    Map {
        /// Projection
        project: ProjectFn<T, R>,
    },
    /// `switch_map`
    SwitchMap {
        /// Inner stream projection
        project: SwitchProjectFn<T, R>,
    },
    /// `filter`
    Filter {
        /// Predicate
        predicate: PredicateFn<T>,
        /// Type proof
        same: Same<T, R>,
    },
    /// `catch_error`
    CatchError {
        /// Recovery selector
        selector: SelectorFn<T>,
        /// Type proof
        same: Same<T, R>,
    },
    /// `tap`
    Tap {
        /// Callbacks
        args: Rc<TapArgs<T>>,
        /// Type proof
        same: Same<T, R>,
    },
    /// `first`
    First {
        /// Predicate and default
        args: Rc<FirstArgs<T>>,
        /// Type proof
        same: Same<T, R>,
    },
    /// `start_with`
    StartWith {
        /// Prefix values
        values: Rc<Vec<T>>,
        /// Type proof
        same: Same<T, R>,
    },
    /// `debounce_time`
    DebounceTime {
        /// Quiet period and scheduler
        timing: TimingArgs,
        /// Type proof
        same: Same<T, R>,
    },
    /// `audit_time`
    AuditTime {
        /// Window and scheduler
        timing: TimingArgs,
        /// Type proof
        same: Same<T, R>,
    },
    /// `take_until`
    TakeUntil {
        /// Completion signal
        notifier: Stream<()>,
        /// Type proof
        same: Same<T, R>,
    },
    /// `share`
    Share {
        /// Ref-count behavior
        args: ShareArgs,
        /// Type proof
        same: Same<T, R>,
    },
    /// `finalize`
    Finalize {
        /// Cleanup action
        action: CleanupFn,
        /// Type proof
        same: Same<T, R>,
    },
}

impl<T, R> Operator<T, R> {
    /// The kind of this operator
    #[must_use]
    pub fn kind(&self) -> OperatorKind {
        match self {
            Operator::Map { .. } => OperatorKind::Map,
            Operator::SwitchMap { .. } => OperatorKind::SwitchMap,
            Operator::Filter { .. } => OperatorKind::Filter,
            Operator::CatchError { .. } => OperatorKind::CatchError,
            Operator::Tap { .. } => OperatorKind::Tap,
            Operator::First { .. } => OperatorKind::First,
            Operator::StartWith { .. } => OperatorKind::StartWith,
            Operator::DebounceTime { .. } => OperatorKind::DebounceTime,
            Operator::AuditTime { .. } => OperatorKind::AuditTime,
            Operator::TakeUntil { .. } => OperatorKind::TakeUntil,
            Operator::Share { .. } => OperatorKind::Share,
            Operator::Finalize { .. } => OperatorKind::Finalize,
        }
    }
}

impl<T, R> fmt::Debug for Operator<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Operator").field(&self.kind()).finish()
    }
}
