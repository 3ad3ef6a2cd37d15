//! Error types for chain construction and stream execution
//!
//! Two families are kept apart:
//! - [`ChainError`]: rejected before any stream activity begins
//!   (invalid operator arguments, invalid configuration)
//! - [`StreamError`]: delivered through a running stream to the nearest
//!   error-recovery step or to the subscriber

use thiserror::Error;

/// Runtime error travelling through a stream.
///
/// Cloneable because a shared stream delivers the same error to every
/// subscriber and a recovery selector may inspect it after delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The producer or an upstream operator failed
    #[error("Upstream failed: {0}")]
    Upstream(String),

    /// The source completed without the value a `first` step required
    #[error("Sequence contains no elements")]
    EmptySequence,

    /// A cleanup action reported a failure
    #[error("Cleanup action failed: {0}")]
    Cleanup(String),
}

impl StreamError {
    /// Create an upstream failure with a message.
    pub fn upstream(msg: impl Into<String>) -> Self {
        StreamError::Upstream(msg.into())
    }

    /// Wrap any error raised by a cleanup action.
    ///
    /// An error that is already a cleanup failure is kept as is.
    pub fn cleanup(err: StreamError) -> Self {
        match err {
            StreamError::Cleanup(_) => err,
            other => StreamError::Cleanup(other.to_string()),
        }
    }

    /// Check whether this error came from a cleanup action.
    pub fn is_cleanup(&self) -> bool {
        matches!(self, StreamError::Cleanup(_))
    }
}

/// Construction and configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// An operator argument is well typed but outside its valid range
    #[error("Invalid argument for {operator}: {reason}")]
    InvalidArgument {
        /// Operator name from the catalog
        operator: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Configuration values failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),
}

impl ChainError {
    /// Create an invalid-argument error for an operator.
    pub fn invalid_argument(operator: &'static str, reason: impl Into<String>) -> Self {
        ChainError::InvalidArgument {
            operator,
            reason: reason.into(),
        }
    }
}

/// A specialized `Result` type for chain construction.
pub type ChainResult<T> = std::result::Result<T, ChainError>;
