//! Single and multi selection over an ordered id list.

use serde::Serialize;

use crate::{Store, SubscriptionId};

/// How many items may be selected at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMode {
    /// Selecting an item replaces the previous selection.
    #[default]
    Single,
    /// Selecting an item adds it to the selection.
    Multiple,
}

/// Snapshot of a [`ListSelection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSelectionState {
    /// Selectable ids in display order.
    pub items: Vec<String>,
    /// Selected ids in selection order.
    pub selected: Vec<String>,
    /// Current selection mode.
    pub mode: SelectionMode,
}

/// Selection behavior over an ordered list of ids.
#[derive(Debug)]
pub struct ListSelection {
    store: Store<ListSelectionState>,
}

impl ListSelection {
    /// Create a selection over `items` with nothing selected.
    pub fn new(items: Vec<String>, mode: SelectionMode) -> Self {
        Self { store: Store::new(ListSelectionState { items, selected: Vec::new(), mode }) }
    }

    /// Current snapshot.
    pub fn state(&self) -> &ListSelectionState {
        self.store.state()
    }

    /// Selected ids in selection order.
    pub fn selected(&self) -> &[String] {
        &self.store.state().selected
    }

    /// Whether `id` is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.store.state().selected.iter().any(|s| s == id)
    }

    /// Register a state listener.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&ListSelectionState) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a state listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Select `id`.
    ///
    /// Single mode replaces the selection; multiple mode appends `id` unless
    /// it is already selected. Unknown ids are ignored.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.store.state().items.iter().any(|item| item == id) {
            tracing::warn!(id, "cannot select unknown item");
            return false;
        }
        self.store.update(|s| match s.mode {
            SelectionMode::Single => s.selected = vec![id.to_string()],
            SelectionMode::Multiple => {
                if !s.selected.iter().any(|selected| selected == id) {
                    s.selected.push(id.to_string());
                }
            },
        })
    }

    /// Remove `id` from the selection.
    pub fn deselect(&mut self, id: &str) -> bool {
        self.store.update(|s| s.selected.retain(|selected| selected != id))
    }

    /// Select `id` if unselected, otherwise deselect it.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.is_selected(id) { self.deselect(id) } else { self.select(id) }
    }

    /// Select every item. Only meaningful in multiple mode.
    pub fn select_all(&mut self) -> bool {
        if self.store.state().mode != SelectionMode::Multiple {
            tracing::warn!("select_all requires multiple selection mode");
            return false;
        }
        self.store.update(|s| s.selected = s.items.clone())
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) -> bool {
        self.store.update(|s| s.selected.clear())
    }

    /// Replace the item list and clear the selection.
    pub fn set_items(&mut self, items: Vec<String>) -> bool {
        self.store.update(|s| {
            s.items = items;
            s.selected.clear();
        })
    }

    /// Replace the item list, keeping selected ids that are still present.
    pub fn retain_items(&mut self, items: Vec<String>) -> bool {
        self.store.update(|s| {
            s.selected.retain(|selected| items.contains(selected));
            s.items = items;
        })
    }

    /// Switch selection mode. Going to single mode keeps the first selected id.
    pub fn set_mode(&mut self, mode: SelectionMode) -> bool {
        self.store.update(|s| {
            s.mode = mode;
            if mode == SelectionMode::Single {
                s.selected.truncate(1);
            }
        })
    }

    /// Drop listeners and stop accepting updates.
    pub fn destroy(&mut self) {
        self.store.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn single_mode_replaces() {
        let mut selection = ListSelection::new(ids(&["a", "b", "c"]), SelectionMode::Single);
        selection.select("a");
        selection.select("c");
        assert_eq!(selection.selected(), ids(&["c"]).as_slice());
    }

    #[test]
    fn multiple_mode_appends_once() {
        let mut selection = ListSelection::new(ids(&["a", "b", "c"]), SelectionMode::Multiple);
        selection.select("b");
        selection.select("a");
        assert!(!selection.select("b"));
        assert_eq!(selection.selected(), ids(&["b", "a"]).as_slice());
    }

    #[test]
    fn unknown_id_is_ignored() {
        let mut selection = ListSelection::new(ids(&["a"]), SelectionMode::Single);
        assert!(!selection.select("zzz"));
        assert!(selection.selected().is_empty());
    }

    #[test]
    fn toggle_and_select_all() {
        let mut selection = ListSelection::new(ids(&["a", "b"]), SelectionMode::Multiple);
        selection.toggle("a");
        selection.toggle("a");
        assert!(selection.selected().is_empty());

        selection.select_all();
        assert_eq!(selection.selected(), ids(&["a", "b"]).as_slice());
    }

    #[test]
    fn retain_items_drops_missing_selection() {
        let mut selection = ListSelection::new(ids(&["a", "b"]), SelectionMode::Multiple);
        selection.select("a");
        selection.select("b");
        selection.retain_items(ids(&["b", "c"]));
        assert_eq!(selection.selected(), ids(&["b"]).as_slice());
    }

    #[test]
    fn switching_to_single_truncates() {
        let mut selection = ListSelection::new(ids(&["a", "b"]), SelectionMode::Multiple);
        selection.select("b");
        selection.select("a");
        selection.set_mode(SelectionMode::Single);
        assert_eq!(selection.selected(), ids(&["b"]).as_slice());
    }
}
