//! Error types shared by behaviors and pattern engines.
//!
//! Engines distinguish three failure classes:
//!
//! - Construction errors are returned from constructors and are fatal to that
//!   call (for example an empty breakpoint table).
//! - Operational misuse (unknown ids, out-of-range indices) is logged with
//!   `tracing::warn!` and the action becomes a no-op. These never surface as
//!   `Err`.
//! - User callback failures are returned by caller-supplied closures as
//!   [`CallbackError`] and isolated at the engine boundary.

use std::fmt;

use thiserror::Error;

/// Failure reported by a caller-supplied callback.
///
/// Engines log these and carry on; a failing callback never leaves an engine
/// in an inconsistent state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("callback failed: {message}")]
pub struct CallbackError {
    /// Human-readable failure description.
    pub message: String,
}

impl CallbackError {
    /// Create a callback error from any displayable message.
    pub fn new(message: impl fmt::Display) -> Self {
        Self { message: message.to_string() }
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self { message: message.to_string() }
    }
}

/// Result type returned by fallible user callbacks.
pub type CallbackResult = Result<(), CallbackError>;
