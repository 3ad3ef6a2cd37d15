//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use typed_rx_test_helpers::prelude::*;
//! ```

pub use crate::must::{must, must_err, must_some, must_with};
pub use crate::probe::{CallCounter, ProducerProbe};
pub use crate::recorder::Recorder;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
