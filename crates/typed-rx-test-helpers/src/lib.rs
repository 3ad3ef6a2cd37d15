//! Shared test utilities for typed-rx.
//!
//! # Modules
//!
//! - [`mod@must`] - Unwrap helpers with good error messages and `#[track_caller]`
//! - [`recorder`] - An observer that records every event, optionally with timestamps
//! - [`probe`] - Counters for producer activity and callback invocations
//! - [`prelude`] - Convenience re-exports
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! typed-rx-test-helpers = { workspace = true }
//! ```
//!
//! ```rust,ignore
//! use typed_rx_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::unwrap_used, clippy::panic)]

pub mod must;
pub mod prelude;
pub mod probe;
pub mod recorder;

pub use must::*;
