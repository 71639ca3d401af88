//! Hub-and-spoke navigation.
//!
//! A hub screen links to spokes, which may nest. The engine tracks which
//! spoke is active, a breadcrumb trail, and an append-only navigation
//! history that [`HubAndSpoke::go_back`] pops one entry at a time.
//!
//! # Invariants
//!
//! - `is_on_hub == active_spoke.is_none()`.
//! - `navigation_history` only grows, except through `go_back`, which
//!   removes exactly one entry.

pub mod history;
pub mod tree;

use std::fmt;

use serde::Serialize;
use tessera_core::{BusEvent, EventBus, Pattern, Store, SubscriptionId};

pub use self::{
    history::{HistoryBridge, HistoryEntry, MemoryHistory},
    tree::Spoke,
};

/// Snapshot of a [`HubAndSpoke`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubState {
    /// Whether the hub is showing.
    pub is_on_hub: bool,
    /// Active spoke id.
    pub active_spoke: Option<String>,
    /// Spoke tree.
    pub spokes: Vec<Spoke>,
    /// Spoke ids leading to the current screen.
    pub breadcrumbs: Vec<String>,
    /// Every navigation step taken, oldest first.
    pub navigation_history: Vec<HistoryEntry>,
}

/// Discrete hub occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubEvent {
    /// A spoke became active.
    SpokeActivated {
        /// Spoke id.
        id: String,
    },
    /// The hub became active.
    ReturnedToHub,
    /// A spoke was added to the tree.
    SpokeAdded {
        /// Spoke id.
        id: String,
    },
    /// A spoke was removed from the tree.
    SpokeRemoved {
        /// Spoke id.
        id: String,
    },
}

impl HubEvent {
    /// Kind of [`HubEvent::SpokeActivated`].
    pub const SPOKE_ACTIVATED: &'static str = "spoke:activated";
    /// Kind of [`HubEvent::ReturnedToHub`].
    pub const RETURNED_TO_HUB: &'static str = "hub:returned";
    /// Kind of [`HubEvent::SpokeAdded`].
    pub const SPOKE_ADDED: &'static str = "spoke:added";
    /// Kind of [`HubEvent::SpokeRemoved`].
    pub const SPOKE_REMOVED: &'static str = "spoke:removed";
}

impl BusEvent for HubEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::SpokeActivated { .. } => Self::SPOKE_ACTIVATED,
            Self::ReturnedToHub => Self::RETURNED_TO_HUB,
            Self::SpokeAdded { .. } => Self::SPOKE_ADDED,
            Self::SpokeRemoved { .. } => Self::SPOKE_REMOVED,
        }
    }
}

/// Construction options for [`HubAndSpoke`].
#[derive(Default)]
pub struct HubAndSpokeOptions {
    /// Spoke tree.
    pub spokes: Vec<Spoke>,
    history: Option<Box<dyn HistoryBridge>>,
    on_spoke_activate: Option<Box<dyn FnMut(&Spoke) + Send>>,
    on_return_to_hub: Option<Box<dyn FnMut() + Send>>,
}

impl fmt::Debug for HubAndSpokeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubAndSpokeOptions")
            .field("spokes", &self.spokes)
            .field("history", &self.history.is_some())
            .finish_non_exhaustive()
    }
}

impl HubAndSpokeOptions {
    /// Options over `spokes` without a history bridge.
    pub fn new(spokes: Vec<Spoke>) -> Self {
        Self { spokes, ..Self::default() }
    }

    /// Mirror transitions into `history`.
    #[must_use]
    pub fn with_history(mut self, history: impl HistoryBridge + 'static) -> Self {
        self.history = Some(Box::new(history));
        self
    }

    /// Called with the spoke after every activation.
    #[must_use]
    pub fn with_on_spoke_activate(mut self, f: impl FnMut(&Spoke) + Send + 'static) -> Self {
        self.on_spoke_activate = Some(Box::new(f));
        self
    }

    /// Called after every return to the hub.
    #[must_use]
    pub fn with_on_return_to_hub(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_return_to_hub = Some(Box::new(f));
        self
    }
}

/// Hub-and-spoke engine.
pub struct HubAndSpoke {
    store: Store<HubState>,
    events: EventBus<HubEvent>,
    history: Option<Box<dyn HistoryBridge>>,
    on_spoke_activate: Option<Box<dyn FnMut(&Spoke) + Send>>,
    on_return_to_hub: Option<Box<dyn FnMut() + Send>>,
}

impl fmt::Debug for HubAndSpoke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubAndSpoke")
            .field("store", &self.store)
            .field("history", &self.history.is_some())
            .finish_non_exhaustive()
    }
}

impl HubAndSpoke {
    /// Create an engine on the hub.
    ///
    /// With a history bridge, the bridge starts listening for pops here.
    pub fn new(options: HubAndSpokeOptions) -> Self {
        let HubAndSpokeOptions { spokes, mut history, on_spoke_activate, on_return_to_hub } =
            options;
        if let Some(history) = history.as_mut() {
            history.listen();
        }
        let state = HubState {
            is_on_hub: true,
            active_spoke: None,
            spokes,
            breadcrumbs: Vec::new(),
            navigation_history: Vec::new(),
        };
        Self {
            store: Store::new(state),
            events: EventBus::new(),
            history,
            on_spoke_activate,
            on_return_to_hub,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> &HubState {
        self.store.state()
    }

    /// Register a state listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&HubState) + Send + 'static) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a state listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Event channel.
    pub fn events_mut(&mut self) -> &mut EventBus<HubEvent> {
        &mut self.events
    }

    /// First spoke with `id`, searching nested spokes depth-first.
    pub fn find_spoke(&self, id: &str) -> Option<&Spoke> {
        tree::find_spoke(&self.store.state().spokes, id)
    }

    /// The active spoke.
    pub fn active_spoke(&self) -> Option<&Spoke> {
        self.find_spoke(self.store.state().active_spoke.as_deref()?)
    }

    /// Activate the spoke with `id`, appending it to breadcrumbs and
    /// history.
    pub fn activate_spoke(&mut self, id: &str) -> bool {
        self.activate(id, true)
    }

    /// Show the hub, clearing breadcrumbs and appending the hub to history.
    pub fn return_to_hub(&mut self) -> bool {
        self.enter_hub(true)
    }

    /// Step back one history entry.
    ///
    /// When history runs out the hub shows. Otherwise breadcrumbs become the
    /// spoke entries left in history and the new last entry is shown, or the
    /// hub if that spoke has since been removed. Going back never pushes to
    /// the history bridge.
    pub fn go_back(&mut self) -> bool {
        if self.store.state().navigation_history.is_empty() {
            tracing::warn!("cannot go back with empty history");
            return false;
        }

        let spokes = &self.store.state().spokes;
        let mut history = self.store.state().navigation_history.clone();
        history.pop();
        // Spokes removed since they were visited are skipped.
        let breadcrumbs: Vec<String> = history
            .iter()
            .filter_map(HistoryEntry::spoke_id)
            .filter(|id| tree::find_spoke(spokes, id).is_some())
            .map(str::to_string)
            .collect();
        let active_spoke = history
            .last()
            .and_then(HistoryEntry::spoke_id)
            .filter(|id| tree::find_spoke(spokes, id).is_some())
            .map(str::to_string);

        let changed = self.store.update(|s| {
            s.navigation_history = history;
            s.breadcrumbs = breadcrumbs;
            s.is_on_hub = active_spoke.is_none();
            s.active_spoke = active_spoke.clone();
        });
        if changed {
            match active_spoke {
                Some(id) => self.notify_spoke(&id),
                None => self.notify_hub(),
            }
        }
        changed
    }

    /// Replay an entry popped from the host history without pushing it
    /// back.
    pub fn pop_state(&mut self, entry: &HistoryEntry) -> bool {
        match entry {
            HistoryEntry::Hub => self.enter_hub(false),
            HistoryEntry::Spoke(id) => self.activate(id, false),
        }
    }

    /// Add `spoke` at the top level or under `parent`.
    ///
    /// Unknown parents are refused with a warning.
    pub fn add_spoke(&mut self, spoke: Spoke, parent: Option<&str>) -> bool {
        let id = spoke.id.clone();
        let Some(spokes) = tree::add_spoke(&self.store.state().spokes, spoke, parent) else {
            tracing::warn!(id, parent, "cannot add spoke under unknown parent");
            return false;
        };
        let changed = self.store.update(|s| s.spokes = spokes);
        if changed {
            self.events.emit(&HubEvent::SpokeAdded { id });
        }
        changed
    }

    /// Remove every spoke named `id` and its nested spokes.
    ///
    /// If the active spoke disappears with it, the hub shows in the same
    /// update.
    pub fn remove_spoke(&mut self, id: &str) -> bool {
        let state = self.store.state();
        if tree::find_spoke(&state.spokes, id).is_none() {
            tracing::warn!(id, "cannot remove unknown spoke");
            return false;
        }
        let spokes = tree::remove_spoke(&state.spokes, id);
        let active_removed = state
            .active_spoke
            .as_deref()
            .is_some_and(|active| tree::find_spoke(&spokes, active).is_none());

        let changed = self.store.update(|s| {
            s.spokes = spokes;
            if active_removed {
                s.is_on_hub = true;
                s.active_spoke = None;
                s.breadcrumbs.clear();
                s.navigation_history.push(HistoryEntry::Hub);
            }
        });
        if !changed {
            return false;
        }
        self.events.emit(&HubEvent::SpokeRemoved { id: id.to_string() });
        if active_removed {
            tracing::debug!(id, "active spoke removed, returning to hub");
            self.push_history(&HistoryEntry::Hub);
            self.notify_hub();
        }
        true
    }

    /// Stop listening to the history bridge and release listeners.
    /// Idempotent.
    pub fn destroy(&mut self) {
        if let Some(mut history) = self.history.take() {
            history.unlisten();
        }
        self.store.destroy();
        self.events.close();
        self.on_spoke_activate = None;
        self.on_return_to_hub = None;
    }

    /// Whether [`HubAndSpoke::destroy`] has been called.
    pub fn is_destroyed(&self) -> bool {
        self.store.is_destroyed()
    }

    fn activate(&mut self, id: &str, push: bool) -> bool {
        if self.find_spoke(id).is_none() {
            tracing::warn!(id, "cannot activate unknown spoke");
            return false;
        }
        let changed = self.store.update(|s| {
            s.is_on_hub = false;
            s.active_spoke = Some(id.to_string());
            s.breadcrumbs.push(id.to_string());
            s.navigation_history.push(HistoryEntry::Spoke(id.to_string()));
        });
        if !changed {
            return false;
        }
        if push {
            self.push_history(&HistoryEntry::Spoke(id.to_string()));
        }
        self.notify_spoke(id);
        true
    }

    fn enter_hub(&mut self, push: bool) -> bool {
        let changed = self.store.update(|s| {
            s.is_on_hub = true;
            s.active_spoke = None;
            s.breadcrumbs.clear();
            s.navigation_history.push(HistoryEntry::Hub);
        });
        if !changed {
            return false;
        }
        if push {
            self.push_history(&HistoryEntry::Hub);
        }
        self.notify_hub();
        true
    }

    fn push_history(&mut self, entry: &HistoryEntry) {
        if let Some(history) = self.history.as_mut() {
            history.push(entry);
        }
    }

    fn notify_spoke(&mut self, id: &str) {
        if let Some(on_spoke_activate) = self.on_spoke_activate.as_mut()
            && let Some(spoke) = tree::find_spoke(&self.store.state().spokes, id)
        {
            on_spoke_activate(spoke);
        }
        self.events.emit(&HubEvent::SpokeActivated { id: id.to_string() });
    }

    fn notify_hub(&mut self) {
        if let Some(on_return_to_hub) = self.on_return_to_hub.as_mut() {
            on_return_to_hub();
        }
        self.events.emit(&HubEvent::ReturnedToHub);
    }
}

impl Pattern for HubAndSpoke {
    type State = HubState;

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
