//! Standard invariant checks.
//!
//! Each check reads one engine snapshot and verifies a property that every
//! action must preserve.

use std::collections::HashSet;

use tessera_patterns::{
    Breakpoint, CommandPaletteState, GridState, HubState, ModalState, TabsState, ToastQueueState,
    WizardState, grid_layout::breakpoint, hub_and_spoke::tree,
};

use super::{Invariant, InvariantResult, Violation, allows_many};

fn violation(invariant: &'static str, message: String) -> InvariantResult {
    Err(Violation { invariant, message })
}

/// Grid focus is `None` exactly when the grid is empty, otherwise in bounds.
pub struct FocusInBounds;

impl<T> Invariant<GridState<T>> for FocusInBounds {
    fn name(&self) -> &'static str {
        "focus_in_bounds"
    }

    fn check(&self, state: &GridState<T>) -> InvariantResult {
        let len = state.items.len();
        match state.focused_index {
            None if len == 0 => Ok(()),
            Some(index) if index < len => Ok(()),
            other => violation(Invariant::<GridState<T>>::name(self), format!("focused {other:?} with {len} items")),
        }
    }
}

/// Grid selection only names current items, at most one in single mode.
pub struct SelectionReferencesItems<T> {
    /// Item id extractor matching the grid's.
    pub get_id: fn(&T) -> String,
}

impl<T> Invariant<GridState<T>> for SelectionReferencesItems<T> {
    fn name(&self) -> &'static str {
        "selection_references_items"
    }

    fn check(&self, state: &GridState<T>) -> InvariantResult {
        let ids: HashSet<String> = state.items.iter().map(self.get_id).collect();
        if let Some(stale) = state.selected_items.iter().find(|id| !ids.contains(*id)) {
            return violation(self.name(), format!("selected id {stale:?} is not an item"));
        }
        if !allows_many(state.selection_mode) && state.selected_items.len() > 1 {
            return violation(
                self.name(),
                format!("{} items selected in single mode", state.selected_items.len()),
            );
        }
        Ok(())
    }
}

/// Grid columns come from the widest breakpoint that fits the viewport.
pub struct BreakpointMatchesViewport {
    /// Breakpoint table the grid was built with.
    pub breakpoints: Vec<Breakpoint>,
}

impl<T> Invariant<GridState<T>> for BreakpointMatchesViewport {
    fn name(&self) -> &'static str {
        "breakpoint_matches_viewport"
    }

    fn check(&self, state: &GridState<T>) -> InvariantResult {
        let Ok(table) = breakpoint::normalize(self.breakpoints.clone()) else {
            return violation(Invariant::<GridState<T>>::name(self), "breakpoint table is invalid".to_string());
        };
        let Some(expected) = breakpoint::resolve(&table, state.viewport_width) else {
            return violation(Invariant::<GridState<T>>::name(self), "breakpoint table is empty".to_string());
        };
        if state.columns != expected.columns || state.breakpoint != *expected {
            return violation(
                Invariant::<GridState<T>>::name(self),
                format!(
                    "width {} resolved to {} columns, expected {}",
                    state.viewport_width, state.columns, expected.columns
                ),
            );
        }
        Ok(())
    }
}

/// Modal stack is sorted by descending priority.
pub struct ModalStackOrdered;

impl<C> Invariant<ModalState<C>> for ModalStackOrdered {
    fn name(&self) -> &'static str {
        "modal_stack_ordered"
    }

    fn check(&self, state: &ModalState<C>) -> InvariantResult {
        for pair in state.stack.windows(2) {
            if let [above, below] = pair
                && above.priority < below.priority
            {
                return violation(
                    Invariant::<ModalState<C>>::name(self),
                    format!(
                        "{} (priority {}) sits above {} (priority {})",
                        above.id, above.priority, below.id, below.priority
                    ),
                );
            }
        }
        let mut seen = HashSet::new();
        if let Some(dup) = state.stack.iter().find(|entry| !seen.insert(entry.id.as_str())) {
            return violation(Invariant::<ModalState<C>>::name(self), format!("modal {:?} is stacked twice", dup.id));
        }
        Ok(())
    }
}

/// `top_modal_id` names the head of the stack.
pub struct TopModalIsHead;

impl<C> Invariant<ModalState<C>> for TopModalIsHead {
    fn name(&self) -> &'static str {
        "top_modal_is_head"
    }

    fn check(&self, state: &ModalState<C>) -> InvariantResult {
        let head = state.stack.first().map(|entry| entry.id.as_str());
        if state.top_modal_id.as_deref() == head {
            Ok(())
        } else {
            violation(
                Invariant::<ModalState<C>>::name(self),
                format!("top is {:?} but stack head is {head:?}", state.top_modal_id),
            )
        }
    }
}

/// The active tab exists and is enabled; no tab is active only when none
/// is enabled.
pub struct ActiveTabUsable;

impl Invariant<TabsState> for ActiveTabUsable {
    fn name(&self) -> &'static str {
        "active_tab_usable"
    }

    fn check(&self, state: &TabsState) -> InvariantResult {
        match state.active_tab_id.as_deref() {
            Some(id) => match state.tabs.iter().find(|tab| tab.id == id) {
                Some(tab) if !tab.disabled => Ok(()),
                Some(_) => violation(self.name(), format!("active tab {id:?} is disabled")),
                None => violation(self.name(), format!("active tab {id:?} does not exist")),
            },
            None if state.tabs.iter().all(|tab| tab.disabled) => Ok(()),
            None => violation(self.name(), "no active tab while some are enabled".to_string()),
        }
    }
}

/// Tab focus is `None` exactly when there are no tabs, otherwise in bounds.
pub struct TabFocusInBounds;

impl Invariant<TabsState> for TabFocusInBounds {
    fn name(&self) -> &'static str {
        "tab_focus_in_bounds"
    }

    fn check(&self, state: &TabsState) -> InvariantResult {
        let len = state.tabs.len();
        match state.focused_index {
            None if len == 0 => Ok(()),
            Some(index) if index < len => Ok(()),
            other => violation(self.name(), format!("focused {other:?} with {len} tabs")),
        }
    }
}

/// Palette selection points into the filtered results, or is zero when
/// there are none.
pub struct PaletteSelectionInBounds;

impl Invariant<CommandPaletteState> for PaletteSelectionInBounds {
    fn name(&self) -> &'static str {
        "palette_selection_in_bounds"
    }

    fn check(&self, state: &CommandPaletteState) -> InvariantResult {
        let len = state.filtered_commands.len();
        if state.selected_index < len || (len == 0 && state.selected_index == 0) {
            Ok(())
        } else {
            violation(self.name(), format!("selected {} of {len} results", state.selected_index))
        }
    }
}

/// Filtered results are registered, enabled commands.
pub struct PaletteShowsOnlyEnabled;

impl Invariant<CommandPaletteState> for PaletteShowsOnlyEnabled {
    fn name(&self) -> &'static str {
        "palette_shows_only_enabled"
    }

    fn check(&self, state: &CommandPaletteState) -> InvariantResult {
        for ranked in &state.filtered_commands {
            let id = &ranked.command.id;
            if ranked.command.disabled {
                return violation(self.name(), format!("disabled command {id:?} is listed"));
            }
            if !state.commands.iter().any(|command| command.id == *id) {
                return violation(self.name(), format!("unregistered command {id:?} is listed"));
            }
        }
        Ok(())
    }
}

/// `is_on_hub` is true exactly when no spoke is active.
pub struct HubFlagConsistent;

impl Invariant<HubState> for HubFlagConsistent {
    fn name(&self) -> &'static str {
        "hub_flag_consistent"
    }

    fn check(&self, state: &HubState) -> InvariantResult {
        if state.is_on_hub == state.active_spoke.is_none() {
            Ok(())
        } else {
            violation(
                self.name(),
                format!("is_on_hub={} with active {:?}", state.is_on_hub, state.active_spoke),
            )
        }
    }
}

/// The active spoke is somewhere in the spoke tree.
pub struct ActiveSpokeExists;

impl Invariant<HubState> for ActiveSpokeExists {
    fn name(&self) -> &'static str {
        "active_spoke_exists"
    }

    fn check(&self, state: &HubState) -> InvariantResult {
        match state.active_spoke.as_deref() {
            Some(id) if tree::find_spoke(&state.spokes, id).is_none() => {
                violation(self.name(), format!("active spoke {id:?} is not in the tree"))
            },
            _ => Ok(()),
        }
    }
}

/// Toast ids are unique.
pub struct ToastIdsUnique;

impl Invariant<ToastQueueState> for ToastIdsUnique {
    fn name(&self) -> &'static str {
        "toast_ids_unique"
    }

    fn check(&self, state: &ToastQueueState) -> InvariantResult {
        let mut seen = HashSet::new();
        match state.toasts.iter().find(|toast| !seen.insert(toast.id.as_str())) {
            Some(dup) => violation(self.name(), format!("toast {:?} queued twice", dup.id)),
            None => Ok(()),
        }
    }
}

/// The current wizard step exists.
pub struct WizardStepInRange;

impl Invariant<WizardState> for WizardStepInRange {
    fn name(&self) -> &'static str {
        "wizard_step_in_range"
    }

    fn check(&self, state: &WizardState) -> InvariantResult {
        if state.current_step_index < state.steps.len() {
            Ok(())
        } else {
            violation(
                self.name(),
                format!("step {} of {}", state.current_step_index, state.steps.len()),
            )
        }
    }
}

/// Completed steps are distinct, existing steps.
pub struct CompletedStepsValid;

impl Invariant<WizardState> for CompletedStepsValid {
    fn name(&self) -> &'static str {
        "completed_steps_valid"
    }

    fn check(&self, state: &WizardState) -> InvariantResult {
        let mut seen = HashSet::new();
        for &index in &state.completed_steps {
            if index >= state.steps.len() {
                return violation(self.name(), format!("completed step {index} does not exist"));
            }
            if !seen.insert(index) {
                return violation(self.name(), format!("step {index} completed twice"));
            }
        }
        Ok(())
    }
}
