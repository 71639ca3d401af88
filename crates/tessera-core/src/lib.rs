//! Core building blocks for Tessera interaction-pattern engines.
//!
//! # Components
//!
//! - [`Store`]: immutable-snapshot state container with subscriptions
//! - [`EventBus`]: typed publish/subscribe channel for discrete events
//! - [`Environment`]: clock abstraction so timer-driven engines run the same
//!   code in production and in deterministic simulation
//! - [`behaviors`]: selection, roving focus, disclosure, dialog and form
//!   primitives composed by the pattern engines
//! - [`Pattern`]: the uniform `state`/`subscribe`/`destroy` contract

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod behaviors;
pub mod env;
pub mod error;
mod event_bus;
mod pattern;
mod store;

pub use env::{Environment, SystemEnv};
pub use error::{CallbackError, CallbackResult};
pub use event_bus::{BusEvent, EventBus, Handler};
pub use pattern::Pattern;
pub use store::{Listener, Store, SubscriptionId};
