//! Chain configuration and the unhandled-error channel
//!
//! Configuration is installed per thread: the stream model is single-threaded,
//! so every chain built and driven on a thread sees the same settings.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::{ChainError, ChainResult, StreamError};

/// What happens to errors nobody handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnhandledErrorPolicy {
    /// Log through `tracing` only
    #[default]
    Log,
    /// Log and keep the most recent errors for [`take_unhandled_errors`]
    Collect,
}

/// Runtime settings for chains built on the current thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Emit a `trace` event for every appended chain step
    pub trace_steps: bool,
    /// Default for `share`: disconnect from the source when the last
    /// subscriber leaves
    pub share_reset_on_ref_count_zero: bool,
    /// Policy for errors without a handler
    pub unhandled_errors: UnhandledErrorPolicy,
    /// Maximum number of collected unhandled errors
    pub unhandled_error_capacity: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            trace_steps: false,
            share_reset_on_ref_count_zero: true,
            unhandled_errors: UnhandledErrorPolicy::Log,
            unhandled_error_capacity: 64,
        }
    }
}

impl ChainConfig {
    /// Parse a configuration from JSON.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::ConfigParse`] on malformed input and
    /// [`ChainError::InvalidConfig`] when validation fails.
    pub fn from_json(input: &str) -> ChainResult<Self> {
        let config: ChainConfig =
            serde_json::from_str(input).map_err(|e| ChainError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidConfig`] if `unhandled_error_capacity` is zero.
    pub fn validate(&self) -> ChainResult<()> {
        if self.unhandled_error_capacity == 0 {
            return Err(ChainError::InvalidConfig(
                "unhandled_error_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Enable or disable step tracing
    pub fn trace_steps(mut self, enabled: bool) -> Self {
        self.trace_steps = enabled;
        self
    }

    /// Set the default ref-count reset behavior of `share`
    pub fn share_reset_on_ref_count_zero(mut self, reset: bool) -> Self {
        self.share_reset_on_ref_count_zero = reset;
        self
    }

    /// Set the unhandled-error policy
    pub fn unhandled_errors(mut self, policy: UnhandledErrorPolicy) -> Self {
        self.unhandled_errors = policy;
        self
    }

    /// Set the collected unhandled-error capacity
    pub fn unhandled_error_capacity(mut self, capacity: usize) -> Self {
        self.unhandled_error_capacity = capacity;
        self
    }
}

thread_local! {
    static ACTIVE: RefCell<ChainConfig> = RefCell::new(ChainConfig::default());
    static UNHANDLED: RefCell<VecDeque<StreamError>> = const { RefCell::new(VecDeque::new()) };
}

/// Validate and install a configuration for the current thread.
///
/// # Errors
///
/// Returns [`ChainError::InvalidConfig`] if validation fails; the active
/// configuration is left unchanged.
pub fn install(config: ChainConfig) -> ChainResult<()> {
    config.validate()?;
    ACTIVE.with(|active| *active.borrow_mut() = config);
    Ok(())
}

/// Get a copy of the configuration active on the current thread
pub fn current() -> ChainConfig {
    ACTIVE.with(|active| active.borrow().clone())
}

/// Report an error that no subscriber handles.
///
/// Used for errors reaching a subscriber without an error callback and for
/// failures of cleanup actions.
pub fn report_unhandled(err: StreamError) {
    let config = current();
    match config.unhandled_errors {
        UnhandledErrorPolicy::Log => {
            error!(error = %err, "Unhandled stream error");
        }
        UnhandledErrorPolicy::Collect => {
            warn!(error = %err, "Unhandled stream error collected");
            UNHANDLED.with(|errors| {
                let mut errors = errors.borrow_mut();
                if errors.len() >= config.unhandled_error_capacity {
                    errors.pop_front();
                }
                errors.push_back(err);
            });
        }
    }
}

/// Drain the errors collected under [`UnhandledErrorPolicy::Collect`]
pub fn take_unhandled_errors() -> Vec<StreamError> {
    UNHANDLED.with(|errors| errors.borrow_mut().drain(..).collect())
}
