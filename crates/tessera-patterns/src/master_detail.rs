//! List/detail pairing.
//!
//! The list side is a single-mode [`ListSelection`]; the detail side is the
//! item whose id is selected, looked up on demand.

use std::fmt;

use serde::Serialize;
use tessera_core::{
    BusEvent, EventBus, Pattern, Store, SubscriptionId,
    behaviors::{ListSelection, SelectionMode},
};

/// Snapshot of a [`MasterDetail`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterDetailState<T> {
    /// Items in list order.
    pub items: Vec<T>,
    /// Id of the item shown in the detail pane.
    pub selected_id: Option<String>,
}

/// Discrete master/detail occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MasterDetailEvent {
    /// An item was selected.
    ItemSelected {
        /// Selected id.
        id: String,
    },
    /// The selection was cleared.
    SelectionCleared,
}

impl MasterDetailEvent {
    /// Kind of [`MasterDetailEvent::ItemSelected`].
    pub const ITEM_SELECTED: &'static str = "item:selected";
    /// Kind of [`MasterDetailEvent::SelectionCleared`].
    pub const SELECTION_CLEARED: &'static str = "selection:cleared";
}

impl BusEvent for MasterDetailEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::ItemSelected { .. } => Self::ITEM_SELECTED,
            Self::SelectionCleared => Self::SELECTION_CLEARED,
        }
    }
}

type IdFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;
type SelectionCallback<T> = Box<dyn FnMut(Option<&T>) + Send>;

/// Construction options for [`MasterDetail`].
pub struct MasterDetailOptions<T> {
    /// Initial items.
    pub items: Vec<T>,
    /// Id to select initially. Ignored if no item has it.
    pub initial_selected_id: Option<String>,
    get_id: IdFn<T>,
    on_selection_change: Option<SelectionCallback<T>>,
}

impl<T> fmt::Debug for MasterDetailOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterDetailOptions")
            .field("items", &self.items.len())
            .field("initial_selected_id", &self.initial_selected_id)
            .finish_non_exhaustive()
    }
}

impl<T> MasterDetailOptions<T> {
    /// Options over `items` identified by `get_id`, nothing selected.
    pub fn new(items: Vec<T>, get_id: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        Self {
            items,
            initial_selected_id: None,
            get_id: Box::new(get_id),
            on_selection_change: None,
        }
    }

    /// Select `id` initially.
    #[must_use]
    pub fn initial_selected_id(mut self, id: impl Into<String>) -> Self {
        self.initial_selected_id = Some(id.into());
        self
    }

    /// Called with the newly selected item, or `None` when cleared.
    #[must_use]
    pub fn with_on_selection_change(mut self, f: impl FnMut(Option<&T>) + Send + 'static) -> Self {
        self.on_selection_change = Some(Box::new(f));
        self
    }
}

/// Master/detail engine.
pub struct MasterDetail<T> {
    store: Store<MasterDetailState<T>>,
    events: EventBus<MasterDetailEvent>,
    selection: ListSelection,
    get_id: IdFn<T>,
    on_selection_change: Option<SelectionCallback<T>>,
}

impl<T: fmt::Debug> fmt::Debug for MasterDetail<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterDetail").field("store", &self.store).finish_non_exhaustive()
    }
}

impl<T> MasterDetail<T>
where
    T: Clone + PartialEq,
{
    /// Create an engine from `options`.
    pub fn new(options: MasterDetailOptions<T>) -> Self {
        let MasterDetailOptions { items, initial_selected_id, get_id, on_selection_change } =
            options;

        let ids: Vec<String> = items.iter().map(|item| get_id(item)).collect();
        let mut selection = ListSelection::new(ids, SelectionMode::Single);
        if let Some(id) = initial_selected_id.as_deref() {
            selection.select(id);
        }
        let selected_id = selection.selected().first().cloned();

        Self {
            store: Store::new(MasterDetailState { items, selected_id }),
            events: EventBus::new(),
            selection,
            get_id,
            on_selection_change,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> &MasterDetailState<T> {
        self.store.state()
    }

    /// Register a state listener.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&MasterDetailState<T>) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a state listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Event channel.
    pub fn events_mut(&mut self) -> &mut EventBus<MasterDetailEvent> {
        &mut self.events
    }

    /// Item shown in the detail pane.
    pub fn selected_item(&self) -> Option<&T> {
        let state = self.store.state();
        let id = state.selected_id.as_deref()?;
        state.items.iter().find(|item| (self.get_id)(item) == id)
    }

    /// Show the item with `id`. Unknown ids are ignored with a warning.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.selection.select(id) {
            return false;
        }
        self.sync_selection()
    }

    /// Clear the detail pane.
    pub fn clear_selection(&mut self) -> bool {
        if !self.selection.clear_selection() {
            return false;
        }
        self.sync_selection()
    }

    /// Select the item after the current one, or the first item if nothing
    /// is selected. Stops at the last item.
    pub fn select_next(&mut self) -> bool {
        let next = match self.selected_position() {
            Some(position) => position + 1,
            None => 0,
        };
        self.select_position(next)
    }

    /// Select the item before the current one, or the last item if nothing
    /// is selected. Stops at the first item.
    pub fn select_previous(&mut self) -> bool {
        let len = self.store.state().items.len();
        let previous = match self.selected_position() {
            Some(0) => return false,
            Some(position) => position - 1,
            None if len == 0 => return false,
            None => len - 1,
        };
        self.select_position(previous)
    }

    /// Replace the items. The selection survives only if its id is still
    /// present.
    pub fn set_items(&mut self, items: Vec<T>) -> bool {
        let ids: Vec<String> = items.iter().map(|item| (self.get_id)(item)).collect();
        let selection_changed = self.selection.retain_items(ids);
        let selected_id = self.selection.selected().first().cloned();
        let changed = self.store.update(|s| {
            s.items = items;
            s.selected_id = selected_id;
        });
        if selection_changed {
            self.notify_selection();
        }
        changed
    }

    /// Release listeners, handlers and the composed selection. Idempotent.
    pub fn destroy(&mut self) {
        self.store.destroy();
        self.events.close();
        self.selection.destroy();
        self.on_selection_change = None;
    }

    /// Whether [`MasterDetail::destroy`] has been called.
    pub fn is_destroyed(&self) -> bool {
        self.store.is_destroyed()
    }

    fn selected_position(&self) -> Option<usize> {
        let state = self.store.state();
        let id = state.selected_id.as_deref()?;
        state.items.iter().position(|item| (self.get_id)(item) == id)
    }

    fn select_position(&mut self, position: usize) -> bool {
        let Some(id) = self.store.state().items.get(position).map(|item| (self.get_id)(item))
        else {
            return false;
        };
        self.select(&id)
    }

    fn sync_selection(&mut self) -> bool {
        let selected_id = self.selection.selected().first().cloned();
        let changed = self.store.update(|s| s.selected_id = selected_id);
        if changed {
            self.notify_selection();
        }
        changed
    }

    fn notify_selection(&mut self) {
        let selected_id = self.store.state().selected_id.clone();
        if let Some(on_selection_change) = self.on_selection_change.as_mut() {
            let state = self.store.state();
            let item = selected_id
                .as_deref()
                .and_then(|id| state.items.iter().find(|item| (self.get_id)(item) == id));
            on_selection_change(item);
        }
        let event = match selected_id {
            Some(id) => MasterDetailEvent::ItemSelected { id },
            None => MasterDetailEvent::SelectionCleared,
        };
        self.events.emit(&event);
    }
}

impl<T> Pattern for MasterDetail<T>
where
    T: Clone + PartialEq + 'static,
{
    type State = MasterDetailState<T>;

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

    #[derive(Debug, Clone, PartialEq)]
    struct Mail {
        id: u32,
        subject: &'static str,
    }

    fn inbox() -> Vec<Mail> {
        vec![
            Mail { id: 1, subject: "hello" },
            Mail { id: 2, subject: "invoice" },
            Mail { id: 3, subject: "lunch" },
        ]
    }

    fn engine() -> MasterDetail<Mail> {
        MasterDetail::new(MasterDetailOptions::new(inbox(), |m: &Mail| m.id.to_string()))
    }

    #[test]
    fn select_projects_item() {
        let mut md = engine();
        assert!(md.select("2"));
        assert_eq!(md.selected_item().map(|m| m.subject), Some("invoice"));
        assert!(!md.select("2"));
    }

    #[test]
    fn unknown_id_is_ignored() {
        let mut md = engine();
        assert!(!md.select("9"));
        assert!(md.state().selected_id.is_none());
    }

    #[test]
    fn next_and_previous_stop_at_edges() {
        let mut md = engine();
        assert!(md.select_next());
        assert_eq!(md.state().selected_id.as_deref(), Some("1"));
        assert!(!md.select_previous());
        md.select("3");
        assert!(!md.select_next());
        assert!(md.select_previous());
        assert_eq!(md.state().selected_id.as_deref(), Some("2"));
    }

    #[test]
    fn set_items_drops_vanished_selection() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut md = MasterDetail::new(
            MasterDetailOptions::new(inbox(), |m: &Mail| m.id.to_string())
                .initial_selected_id("3")
                .with_on_selection_change(move |m| sink.lock().unwrap().push(m.map(|m| m.id))),
        );

        md.set_items(inbox().into_iter().take(2).collect());
        assert!(md.state().selected_id.is_none());
        assert_eq!(*seen.lock().unwrap(), vec![None]);
    }

    #[test]
    fn set_items_keeps_surviving_selection() {
        let mut md = engine();
        md.select("1");
        md.set_items(inbox());
        assert_eq!(md.state().selected_id.as_deref(), Some("1"));
    }

    #[test]
    fn events_follow_selection() {
        let kinds = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&kinds);
        let mut md = engine();
        md.events_mut().on_any(move |e: &MasterDetailEvent| sink.lock().unwrap().push(e.kind()));

        md.select("1");
        md.clear_selection();
        assert_eq!(
            *kinds.lock().unwrap(),
            vec![MasterDetailEvent::ITEM_SELECTED, MasterDetailEvent::SELECTION_CLEARED]
        );
    }

    #[test]
    fn destroy_silences_subscribers() {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let mut md = engine();
        md.subscribe(move |_| *counter.lock().unwrap() += 1);
        md.destroy();
        md.destroy();
        md.select("1");
        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(md.is_destroyed());
    }
}
