//! Tab list with keyboard focus and an active panel.
//!
//! Focus and activation are separate: arrow keys move a [`RovingFocus`]
//! over the tab ids, and the active tab decides which panel shows. The two
//! are synced both ways. Activating a tab moves focus onto it, and in
//! [`ActivationMode::Automatic`] moving focus activates the focused tab. A
//! `syncing` flag held for the duration of one direction stops the other
//! direction from echoing back.
//!
//! Disabled tabs can receive focus but never become active.

use std::fmt;

use serde::Serialize;
use tessera_core::{BusEvent, EventBus, Pattern, Store, SubscriptionId, behaviors::RovingFocus};

use crate::KeyInput;

/// One tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    /// Unique tab id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Disabled tabs are focusable but cannot be activated.
    pub disabled: bool,
}

impl Tab {
    /// Enabled tab.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into(), disabled: false }
    }

    /// Mark the tab disabled.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Whether focus movement activates tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivationMode {
    /// Focusing an enabled tab activates it.
    #[default]
    Automatic,
    /// Tabs activate only on Enter/Space or [`TabbedInterface::activate_tab`].
    Manual,
}

/// Snapshot of a [`TabbedInterface`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabsState {
    /// Tabs in display order.
    pub tabs: Vec<Tab>,
    /// Active tab. `None` only when no tab is enabled.
    pub active_tab_id: Option<String>,
    /// Focused tab position. `None` iff `tabs` is empty.
    pub focused_index: Option<usize>,
    /// Activation mode.
    pub activation_mode: ActivationMode,
}

impl TabsState {
    /// The active tab.
    pub fn active_tab(&self) -> Option<&Tab> {
        let id = self.active_tab_id.as_deref()?;
        self.tabs.iter().find(|tab| tab.id == id)
    }
}

/// Discrete tab occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEvent {
    /// A tab became active.
    TabActivated {
        /// Activated tab id.
        id: String,
    },
    /// Focus moved to another tab.
    TabFocused {
        /// Focused position.
        index: usize,
        /// Focused tab id.
        id: String,
    },
}

impl TabEvent {
    /// Kind of [`TabEvent::TabActivated`].
    pub const TAB_ACTIVATED: &'static str = "tab:activated";
    /// Kind of [`TabEvent::TabFocused`].
    pub const TAB_FOCUSED: &'static str = "tab:focused";
}

impl BusEvent for TabEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::TabActivated { .. } => Self::TAB_ACTIVATED,
            Self::TabFocused { .. } => Self::TAB_FOCUSED,
        }
    }
}

/// Construction options for [`TabbedInterface`].
#[derive(Default)]
pub struct TabbedInterfaceOptions {
    /// Tabs in display order.
    pub tabs: Vec<Tab>,
    /// Tab to activate first. Defaults to the first enabled tab.
    pub initial_active_tab: Option<String>,
    /// Whether focus wraps past the ends.
    pub wrap: bool,
    /// Activation mode.
    pub activation_mode: ActivationMode,
    on_tab_change: Option<Box<dyn FnMut(&Tab) + Send>>,
}

impl fmt::Debug for TabbedInterfaceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabbedInterfaceOptions")
            .field("tabs", &self.tabs)
            .field("initial_active_tab", &self.initial_active_tab)
            .field("wrap", &self.wrap)
            .field("activation_mode", &self.activation_mode)
            .finish_non_exhaustive()
    }
}

impl TabbedInterfaceOptions {
    /// Options with wrapping focus and automatic activation.
    pub fn new(tabs: Vec<Tab>) -> Self {
        Self { tabs, wrap: true, ..Self::default() }
    }

    /// Activate `id` initially.
    #[must_use]
    pub fn initial_active_tab(mut self, id: impl Into<String>) -> Self {
        self.initial_active_tab = Some(id.into());
        self
    }

    /// Enable or disable focus wrapping.
    #[must_use]
    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// Set the activation mode.
    #[must_use]
    pub fn activation_mode(mut self, mode: ActivationMode) -> Self {
        self.activation_mode = mode;
        self
    }

    /// Called with the newly active tab.
    #[must_use]
    pub fn with_on_tab_change(mut self, f: impl FnMut(&Tab) + Send + 'static) -> Self {
        self.on_tab_change = Some(Box::new(f));
        self
    }
}

/// Tabbed interface engine.
pub struct TabbedInterface {
    store: Store<TabsState>,
    events: EventBus<TabEvent>,
    focus: RovingFocus,
    syncing: bool,
    on_tab_change: Option<Box<dyn FnMut(&Tab) + Send>>,
}

impl fmt::Debug for TabbedInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabbedInterface")
            .field("store", &self.store)
            .field("syncing", &self.syncing)
            .finish_non_exhaustive()
    }
}

impl TabbedInterface {
    /// Create an engine from `options`.
    pub fn new(options: TabbedInterfaceOptions) -> Self {
        let TabbedInterfaceOptions {
            tabs,
            initial_active_tab,
            wrap,
            activation_mode,
            on_tab_change,
        } = options;

        let requested = initial_active_tab
            .as_deref()
            .and_then(|id| tabs.iter().find(|tab| tab.id == id && !tab.disabled));
        if requested.is_none()
            && let Some(id) = initial_active_tab.as_deref()
        {
            tracing::warn!(id, "initial tab is unknown or disabled, using first enabled tab");
        }
        let active_tab_id = requested.or_else(|| first_enabled(&tabs)).map(|tab| tab.id.clone());
        let initial_focus = active_tab_id
            .as_deref()
            .and_then(|id| position_of(&tabs, id))
            .unwrap_or(0);

        let focus = RovingFocus::new(ids(&tabs), initial_focus, wrap);
        let state = TabsState {
            focused_index: focus.focused_index(),
            tabs,
            active_tab_id,
            activation_mode,
        };

        Self {
            store: Store::new(state),
            events: EventBus::new(),
            focus,
            syncing: false,
            on_tab_change,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> &TabsState {
        self.store.state()
    }

    /// Register a state listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&TabsState) + Send + 'static) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a state listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Event channel.
    pub fn events_mut(&mut self) -> &mut EventBus<TabEvent> {
        &mut self.events
    }

    /// Activate the tab with `id` and move focus onto it.
    ///
    /// Unknown and disabled tabs are refused with a warning.
    pub fn activate_tab(&mut self, id: &str) -> bool {
        let Some(index) = position_of(&self.store.state().tabs, id) else {
            tracing::warn!(id, "cannot activate unknown tab");
            return false;
        };
        if self.store.state().tabs.get(index).is_some_and(|tab| tab.disabled) {
            tracing::warn!(id, "cannot activate disabled tab");
            return false;
        }

        let changed = self.store.update(|s| s.active_tab_id = Some(id.to_string()));
        if changed {
            self.notify_activated(index);
        }

        if !self.syncing {
            self.syncing = true;
            if self.focus.move_to(index) {
                self.sync_from_focus();
            }
            self.syncing = false;
        }
        changed
    }

    /// Move focus to the next tab.
    pub fn focus_next(&mut self) -> bool {
        let moved = self.focus.move_next();
        moved && self.sync_from_focus()
    }

    /// Move focus to the previous tab.
    pub fn focus_previous(&mut self) -> bool {
        let moved = self.focus.move_previous();
        moved && self.sync_from_focus()
    }

    /// Move focus to the first tab.
    pub fn focus_first(&mut self) -> bool {
        let moved = self.focus.move_first();
        moved && self.sync_from_focus()
    }

    /// Move focus to the last tab.
    pub fn focus_last(&mut self) -> bool {
        let moved = self.focus.move_last();
        moved && self.sync_from_focus()
    }

    /// Move focus to the tab at `index`.
    pub fn focus_tab(&mut self, index: usize) -> bool {
        let moved = self.focus.move_to(index);
        moved && self.sync_from_focus()
    }

    /// Translate a key press on the tab list.
    pub fn handle_key(&mut self, key: KeyInput) -> bool {
        match key {
            KeyInput::Left | KeyInput::Up => self.focus_previous(),
            KeyInput::Right | KeyInput::Down => self.focus_next(),
            KeyInput::Home => self.focus_first(),
            KeyInput::End => self.focus_last(),
            KeyInput::Enter | KeyInput::Char(' ') => {
                match self.focus.focused_item().map(str::to_string) {
                    Some(id) => self.activate_tab(&id),
                    None => false,
                }
            },
            _ => false,
        }
    }

    /// Append `tab`. Duplicate ids are refused.
    ///
    /// The new tab becomes active if no tab was active and it is enabled.
    pub fn add_tab(&mut self, tab: Tab) -> bool {
        if position_of(&self.store.state().tabs, &tab.id).is_some() {
            tracing::warn!(id = tab.id, "tab id already present");
            return false;
        }
        self.restructure(|tabs| tabs.push(tab));
        true
    }

    /// Remove the tab with `id`.
    ///
    /// Focus is re-clamped in the same update. Removing the active tab
    /// activates the first remaining enabled tab.
    pub fn remove_tab(&mut self, id: &str) -> bool {
        if position_of(&self.store.state().tabs, id).is_none() {
            tracing::warn!(id, "cannot remove unknown tab");
            return false;
        }
        self.restructure(|tabs| tabs.retain(|tab| tab.id != id));
        true
    }

    /// Enable or disable the tab with `id`.
    ///
    /// Disabling the active tab activates the first enabled tab instead, and
    /// enabling a tab while none is active activates it.
    pub fn set_tab_disabled(&mut self, id: &str, disabled: bool) -> bool {
        let Some(index) = position_of(&self.store.state().tabs, id) else {
            tracing::warn!(id, "cannot update unknown tab");
            return false;
        };
        if self.store.state().tabs.get(index).is_some_and(|tab| tab.disabled == disabled) {
            return false;
        }
        self.restructure(|tabs| {
            if let Some(tab) = tabs.get_mut(index) {
                tab.disabled = disabled;
            }
        });
        true
    }

    /// Switch activation mode.
    pub fn set_activation_mode(&mut self, mode: ActivationMode) -> bool {
        self.store.update(|s| s.activation_mode = mode)
    }

    /// Release listeners, handlers and the composed focus. Idempotent.
    pub fn destroy(&mut self) {
        self.store.destroy();
        self.events.close();
        self.focus.destroy();
        self.on_tab_change = None;
    }

    /// Whether [`TabbedInterface::destroy`] has been called.
    pub fn is_destroyed(&self) -> bool {
        self.store.is_destroyed()
    }

    /// Mirror focus into state, then activate the focused tab when
    /// activation follows focus.
    fn sync_from_focus(&mut self) -> bool {
        let Some(index) = self.focus.focused_index() else { return false };
        let changed = self.store.update(|s| s.focused_index = Some(index));
        if changed && let Some(tab) = self.store.state().tabs.get(index) {
            self.events.emit(&TabEvent::TabFocused { index, id: tab.id.clone() });
        }

        if self.syncing || self.store.state().activation_mode != ActivationMode::Automatic {
            return changed;
        }
        let Some(tab) = self.store.state().tabs.get(index) else { return changed };
        if tab.disabled {
            return changed;
        }
        let id = tab.id.clone();
        self.syncing = true;
        self.activate_tab(&id);
        self.syncing = false;
        changed
    }

    /// Apply a structural change to the tab list, then re-clamp focus and
    /// repair the active tab in the same state update.
    fn restructure(&mut self, f: impl FnOnce(&mut Vec<Tab>)) {
        let mut tabs = self.store.state().tabs.clone();
        f(&mut tabs);

        let previous_active = self.store.state().active_tab_id.clone();
        let active_still_valid = previous_active
            .as_deref()
            .is_some_and(|id| tabs.iter().any(|tab| tab.id == id && !tab.disabled));
        let active_tab_id = if active_still_valid {
            previous_active.clone()
        } else {
            first_enabled(&tabs).map(|tab| tab.id.clone())
        };

        self.focus.set_items(ids(&tabs));
        // A replacement active tab takes focus with it.
        if active_tab_id != previous_active
            && let Some(index) = active_tab_id.as_deref().and_then(|id| position_of(&tabs, id))
        {
            self.focus.move_to(index);
        }
        let focused_index = self.focus.focused_index();

        self.store.update(|s| {
            s.tabs = tabs;
            s.focused_index = focused_index;
            s.active_tab_id = active_tab_id.clone();
        });

        if active_tab_id != previous_active
            && let Some(index) =
                active_tab_id.as_deref().and_then(|id| position_of(&self.store.state().tabs, id))
        {
            self.notify_activated(index);
        }
    }

    fn notify_activated(&mut self, index: usize) {
        let Some(tab) = self.store.state().tabs.get(index) else { return };
        if let Some(on_tab_change) = self.on_tab_change.as_mut() {
            on_tab_change(tab);
        }
        self.events.emit(&TabEvent::TabActivated { id: tab.id.clone() });
    }
}

fn ids(tabs: &[Tab]) -> Vec<String> {
    tabs.iter().map(|tab| tab.id.clone()).collect()
}

fn position_of(tabs: &[Tab], id: &str) -> Option<usize> {
    tabs.iter().position(|tab| tab.id == id)
}

fn first_enabled(tabs: &[Tab]) -> Option<&Tab> {
    tabs.iter().find(|tab| !tab.disabled)
}

impl Pattern for TabbedInterface {
    type State = TabsState;

    fn state(&self) -> &Self::State {
        Self::state(self)
    }

    fn subscribe(&mut self, listener: Box<dyn FnMut(&Self::State) + Send>) -> SubscriptionId {
        Self::subscribe(self, listener)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        Self::unsubscribe(self, id)
    }

    fn destroy(&mut self) {
        Self::destroy(self);
    }

    fn is_destroyed(&self) -> bool {
        Self::is_destroyed(self)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn tabs() -> Vec<Tab> {
        vec![
            Tab::new("general", "General"),
            Tab::new("billing", "Billing").disabled(true),
            Tab::new("security", "Security"),
        ]
    }

    fn active(tabs: &TabbedInterface) -> Option<&str> {
        tabs.state().active_tab_id.as_deref()
    }

    #[test]
    fn first_enabled_tab_is_active_by_default() {
        let engine = TabbedInterface::new(TabbedInterfaceOptions::new(vec![
            Tab::new("a", "A").disabled(true),
            Tab::new("b", "B"),
        ]));
        assert_eq!(active(&engine), Some("b"));
        assert_eq!(engine.state().focused_index, Some(1));
    }

    #[test]
    fn activation_moves_focus() {
        let mut engine = TabbedInterface::new(TabbedInterfaceOptions::new(tabs()));
        assert!(engine.activate_tab("security"));
        assert_eq!(engine.state().focused_index, Some(2));
    }

    #[test]
    fn automatic_mode_activates_on_focus() {
        let mut engine = TabbedInterface::new(TabbedInterfaceOptions::new(tabs()));
        engine.focus_last();
        assert_eq!(active(&engine), Some("security"));
    }

    #[test]
    fn focus_lands_on_disabled_tab_without_activating() {
        let mut engine = TabbedInterface::new(TabbedInterfaceOptions::new(tabs()));
        assert!(engine.focus_next());
        assert_eq!(engine.state().focused_index, Some(1));
        assert_eq!(active(&engine), Some("general"));
        assert!(!engine.activate_tab("billing"));
    }

    #[test]
    fn manual_mode_requires_enter() {
        let mut engine = TabbedInterface::new(
            TabbedInterfaceOptions::new(tabs()).activation_mode(ActivationMode::Manual),
        );
        engine.handle_key(KeyInput::End);
        assert_eq!(active(&engine), Some("general"));
        engine.handle_key(KeyInput::Enter);
        assert_eq!(active(&engine), Some("security"));
    }

    #[test]
    fn focus_wraps() {
        let mut engine = TabbedInterface::new(TabbedInterfaceOptions::new(tabs()));
        engine.focus_previous();
        assert_eq!(engine.state().focused_index, Some(2));
    }

    #[test]
    fn activation_fires_once_per_change() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut engine = TabbedInterface::new(
            TabbedInterfaceOptions::new(tabs())
                .with_on_tab_change(move |tab| sink.lock().unwrap().push(tab.id.clone())),
        );
        engine.activate_tab("security");
        engine.activate_tab("security");
        engine.focus_first();
        assert_eq!(*seen.lock().unwrap(), vec!["security".to_string(), "general".to_string()]);
    }

    #[test]
    fn removing_active_tab_falls_back() {
        let mut engine = TabbedInterface::new(TabbedInterfaceOptions::new(tabs()));
        engine.activate_tab("security");
        assert!(engine.remove_tab("security"));
        assert_eq!(active(&engine), Some("general"));
        assert_eq!(engine.state().focused_index, Some(0));
        assert!(!engine.remove_tab("security"));
    }

    #[test]
    fn replacement_active_tab_takes_focus() {
        let mut engine = TabbedInterface::new(TabbedInterfaceOptions::new(vec![
            Tab::new("a", "A"),
            Tab::new("b", "B"),
            Tab::new("c", "C"),
            Tab::new("d", "D"),
        ]));
        engine.activate_tab("b");
        assert!(engine.remove_tab("b"));
        let state = engine.state();
        assert_eq!(active(&engine), Some("a"));
        assert_eq!(state.focused_index, state.tabs.iter().position(|tab| tab.id == "a"));
    }

    #[test]
    fn disabling_active_tab_moves_activation() {
        let mut engine = TabbedInterface::new(TabbedInterfaceOptions::new(tabs()));
        engine.set_tab_disabled("general", true);
        assert_eq!(active(&engine), Some("security"));
        assert_eq!(engine.state().focused_index, Some(2));
        engine.set_tab_disabled("billing", false);
        assert_eq!(active(&engine), Some("security"));
    }

    #[test]
    fn add_tab_activates_when_nothing_active() {
        let mut engine = TabbedInterface::new(TabbedInterfaceOptions::new(Vec::new()));
        assert_eq!(engine.state().focused_index, None);
        assert!(engine.add_tab(Tab::new("x", "X")));
        assert_eq!(active(&engine), Some("x"));
        assert_eq!(engine.state().focused_index, Some(0));
        assert!(!engine.add_tab(Tab::new("x", "X")));
    }
}
