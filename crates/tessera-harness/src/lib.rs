//! Deterministic test harness for Tessera pattern engines.
//!
//! # Simulation clock
//!
//! [`SimEnv`] implements [`tessera_core::Environment`] over a virtual clock
//! that only moves when a test advances it, so timer-driven engines such as
//! the toast queue can be tested without real sleeps.
//!
//! # Model-Based Testing
//!
//! The `model` module defines generated host operations for each engine,
//! functions applying them to the real engines, and reference models to
//! compare against. [`seeded_ops`] turns a seed into a reproducible
//! operation sequence.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks properties that must hold after every
//! action. Use the `standard()` registry for an engine's state type.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod model;
pub mod scenario;
pub mod sim_env;

pub use invariants::{Invariant, InvariantRegistry, InvariantResult, Violation};
pub use model::{
    GridOp, HubOp, ModalOp, ModelModalStack, PaletteOp, TabOp, ToastOp, apply_grid, apply_hub,
    apply_modal, apply_palette, apply_tabs, apply_toasts, grid_items,
};
pub use scenario::seeded_ops;
pub use sim_env::{SIM_EPOCH_MILLIS, SimEnv, SimInstant};
