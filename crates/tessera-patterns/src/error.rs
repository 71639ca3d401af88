//! Construction errors for pattern engines.
//!
//! Only constructors return errors. Runtime misuse (unknown ids, out-of-range
//! indices, invalid runtime configuration) is logged and ignored, and wizard
//! validation failures are reported through state.

use thiserror::Error;

/// Invalid grid configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// The breakpoint table has no entries.
    #[error("breakpoints must not be empty")]
    EmptyBreakpoints,

    /// A breakpoint has a negative or non-finite minimum width.
    #[error("invalid breakpoint min width {min_width}")]
    InvalidMinWidth {
        /// Offending width.
        min_width: f64,
    },

    /// A breakpoint has zero columns.
    #[error("breakpoint at min width {min_width} has zero columns")]
    ZeroColumns {
        /// Width of the offending breakpoint.
        min_width: f64,
    },
}

/// Invalid wizard configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// The wizard has no steps.
    #[error("wizard requires at least one step")]
    NoSteps,

    /// Two steps share an id, so branching targets would be ambiguous.
    #[error("duplicate step id {0:?}")]
    DuplicateStepId(String),

    /// The initial step index is past the last step.
    #[error("initial step index {index} out of range for {len} steps")]
    StepIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of steps.
        len: usize,
    },
}
