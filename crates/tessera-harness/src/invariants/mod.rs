//! Invariant checking over engine snapshots.
//!
//! Invariants are properties that must hold after every action, whatever
//! sequence of actions led there. Property tests drive an engine with
//! generated operations and run the registry for that engine's state type
//! after each one.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::<ModalState<()>>::standard();
//! modal.open_modal("a", (), 1);
//! registry.assert_all(modal.state(), "after open");
//! ```

mod checks;

use std::fmt;

pub use checks::{
    ActiveSpokeExists, ActiveTabUsable, BreakpointMatchesViewport, CompletedStepsValid,
    FocusInBounds, HubFlagConsistent, ModalStackOrdered, PaletteSelectionInBounds,
    PaletteShowsOnlyEnabled, SelectionReferencesItems, TabFocusInBounds, ToastIdsUnique,
    TopModalIsHead, WizardStepInRange,
};
use tessera_core::behaviors::SelectionMode;
use tessera_patterns::{
    CommandPaletteState, GridState, HubState, ModalState, TabsState, ToastQueueState, WizardState,
};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A property checked against snapshots of type `S`.
pub trait Invariant<S>: Send + Sync {
    /// Name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against `state`.
    fn check(&self, state: &S) -> InvariantResult;
}

/// Invariants to run against one snapshot type.
pub struct InvariantRegistry<S> {
    invariants: Vec<Box<dyn Invariant<S>>>,
}

impl<S> Default for InvariantRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for InvariantRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.invariants.iter().map(|inv| inv.name()).collect();
        f.debug_struct("InvariantRegistry").field("invariants", &names).finish()
    }
}

impl<S> InvariantRegistry<S> {
    /// Empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Add an invariant.
    pub fn add<I: Invariant<S> + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Run every invariant, collecting all violations.
    pub fn check_all(&self, state: &S) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Run every invariant, panicking with all violations on failure.
    ///
    /// For tests that want immediate failure with context.
    #[allow(clippy::panic)]
    pub fn assert_all(&self, state: &S, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Whether no invariants are registered.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

impl<T: Send + Sync + 'static> InvariantRegistry<GridState<T>> {
    /// Grid invariants for a grid whose item ids come from `get_id`.
    pub fn grid(get_id: fn(&T) -> String) -> Self {
        let mut registry = Self::new();
        registry.add(FocusInBounds);
        registry.add(SelectionReferencesItems { get_id });
        registry
    }

    /// Grid invariants plus breakpoint resolution against `breakpoints`.
    pub fn grid_with_breakpoints(
        get_id: fn(&T) -> String,
        breakpoints: Vec<tessera_patterns::Breakpoint>,
    ) -> Self {
        let mut registry = Self::grid(get_id);
        registry.add(BreakpointMatchesViewport { breakpoints });
        registry
    }
}

impl<C: Send + Sync + 'static> InvariantRegistry<ModalState<C>> {
    /// Modal stack invariants.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(ModalStackOrdered);
        registry.add(TopModalIsHead);
        registry
    }
}

impl InvariantRegistry<TabsState> {
    /// Tabbed interface invariants.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(ActiveTabUsable);
        registry.add(TabFocusInBounds);
        registry
    }
}

impl InvariantRegistry<CommandPaletteState> {
    /// Command palette invariants.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(PaletteSelectionInBounds);
        registry.add(PaletteShowsOnlyEnabled);
        registry
    }
}

impl InvariantRegistry<HubState> {
    /// Hub-and-spoke invariants.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(HubFlagConsistent);
        registry.add(ActiveSpokeExists);
        registry
    }
}

impl InvariantRegistry<ToastQueueState> {
    /// Toast queue invariants.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(ToastIdsUnique);
        registry
    }
}

impl InvariantRegistry<WizardState> {
    /// Wizard invariants.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(WizardStepInRange);
        registry.add(CompletedStepsValid);
        registry
    }
}

/// Whether `mode` allows more than one selected item.
pub(crate) fn allows_many(mode: SelectionMode) -> bool {
    matches!(mode, SelectionMode::Multiple)
}
