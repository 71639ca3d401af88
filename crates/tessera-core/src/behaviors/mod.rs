//! Primitive behaviors composed by the pattern engines.
//!
//! Each behavior is a small single-purpose state machine built on
//! [`crate::Store`]. Pattern engines own their behaviors directly and drive
//! them through method calls, mirroring the resulting snapshots into their
//! own state.

mod dialog;
mod disclosure;
mod form;
mod roving_focus;
mod selection;

pub use dialog::{DialogBehavior, DialogState};
pub use disclosure::{Disclosure, DisclosureState};
pub use form::{FieldValidator, FormBehavior, FormState, FormValues};
pub use roving_focus::{RovingFocus, RovingFocusState, clamp_index};
pub use selection::{ListSelection, ListSelectionState, SelectionMode};
