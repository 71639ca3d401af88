//! Index-based keyboard focus over an ordered item list.
//!
//! Focus is a single movable index. `None` means there is nothing to focus,
//! which happens exactly when the item list is empty.

use serde::Serialize;

use crate::{Store, SubscriptionId};

/// Snapshot of a [`RovingFocus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RovingFocusState {
    /// Focusable ids in navigation order.
    pub items: Vec<String>,
    /// Focused position. `None` iff `items` is empty.
    pub focused_index: Option<usize>,
    /// Whether moving past either end wraps to the other end.
    pub wrap: bool,
}

/// Roving keyboard focus behavior.
#[derive(Debug)]
pub struct RovingFocus {
    store: Store<RovingFocusState>,
}

impl RovingFocus {
    /// Create a focus over `items`, focusing `initial` clamped into bounds.
    pub fn new(items: Vec<String>, initial: usize, wrap: bool) -> Self {
        let focused_index = clamp_index(initial, items.len());
        Self { store: Store::new(RovingFocusState { items, focused_index, wrap }) }
    }

    /// Current snapshot.
    pub fn state(&self) -> &RovingFocusState {
        self.store.state()
    }

    /// Focused position.
    pub fn focused_index(&self) -> Option<usize> {
        self.store.state().focused_index
    }

    /// Focused id.
    pub fn focused_item(&self) -> Option<&str> {
        let state = self.store.state();
        state.focused_index.and_then(|i| state.items.get(i)).map(String::as_str)
    }

    /// Register a state listener.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&RovingFocusState) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a state listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Move focus forward one item. Returns `true` if focus moved.
    pub fn move_next(&mut self) -> bool {
        let state = self.store.state();
        let Some(current) = state.focused_index else { return false };
        let len = state.items.len();
        let next = if current + 1 < len {
            current + 1
        } else if state.wrap {
            0
        } else {
            return false;
        };
        self.set_index(next)
    }

    /// Move focus back one item. Returns `true` if focus moved.
    pub fn move_previous(&mut self) -> bool {
        let state = self.store.state();
        let Some(current) = state.focused_index else { return false };
        let len = state.items.len();
        let previous = if current > 0 {
            current - 1
        } else if state.wrap {
            len - 1
        } else {
            return false;
        };
        self.set_index(previous)
    }

    /// Focus the item at `index`. Out-of-range indices are ignored.
    pub fn move_to(&mut self, index: usize) -> bool {
        let len = self.store.state().items.len();
        if index >= len {
            tracing::warn!(index, len, "focus index out of range");
            return false;
        }
        self.set_index(index)
    }

    /// Focus the first item.
    pub fn move_first(&mut self) -> bool {
        if self.store.state().items.is_empty() {
            return false;
        }
        self.set_index(0)
    }

    /// Focus the last item.
    pub fn move_last(&mut self) -> bool {
        let len = self.store.state().items.len();
        if len == 0 {
            return false;
        }
        self.set_index(len - 1)
    }

    /// Replace the item list, re-clamping focus in the same update.
    pub fn set_items(&mut self, items: Vec<String>) -> bool {
        self.store.update(|s| {
            let current = s.focused_index.unwrap_or(0);
            s.focused_index = clamp_index(current, items.len());
            s.items = items;
        })
    }

    /// Enable or disable wrap-around.
    pub fn set_wrap(&mut self, wrap: bool) -> bool {
        self.store.update(|s| s.wrap = wrap)
    }

    /// Drop listeners and stop accepting updates.
    pub fn destroy(&mut self) {
        self.store.destroy();
    }

    fn set_index(&mut self, index: usize) -> bool {
        self.store.update(|s| s.focused_index = Some(index))
    }
}

/// Clamp `index` into `0..len`, or `None` for an empty list.
pub fn clamp_index(index: usize, len: usize) -> Option<usize> {
    if len == 0 { None } else { Some(index.min(len - 1)) }
}
