//! Expand/collapse disclosure.

use std::fmt;

use serde::Serialize;

use crate::{Store, SubscriptionId};

/// Snapshot of a [`Disclosure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosureState {
    /// Whether the disclosed region is visible.
    pub is_expanded: bool,
}

type Callback = Box<dyn FnMut() + Send>;

/// Boolean expand/collapse behavior with transition callbacks.
pub struct Disclosure {
    store: Store<DisclosureState>,
    on_expand: Option<Callback>,
    on_collapse: Option<Callback>,
}

impl fmt::Debug for Disclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disclosure").field("store", &self.store).finish_non_exhaustive()
    }
}

impl Disclosure {
    /// Create a disclosure in the given initial state.
    pub fn new(initially_expanded: bool) -> Self {
        Self {
            store: Store::new(DisclosureState { is_expanded: initially_expanded }),
            on_expand: None,
            on_collapse: None,
        }
    }

    /// Call `f` after every collapsed → expanded transition.
    #[must_use]
    pub fn with_on_expand(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_expand = Some(Box::new(f));
        self
    }

    /// Call `f` after every expanded → collapsed transition.
    #[must_use]
    pub fn with_on_collapse(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_collapse = Some(Box::new(f));
        self
    }

    /// Current snapshot.
    pub fn state(&self) -> DisclosureState {
        *self.store.state()
    }

    /// Whether the region is expanded.
    pub fn is_expanded(&self) -> bool {
        self.store.state().is_expanded
    }

    /// Register a state listener.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&DisclosureState) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a state listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Expand. Returns `true` if the state changed.
    pub fn expand(&mut self) -> bool {
        let changed = self.store.update(|s| s.is_expanded = true);
        if changed && let Some(on_expand) = self.on_expand.as_mut() {
            on_expand();
        }
        changed
    }

    /// Collapse. Returns `true` if the state changed.
    pub fn collapse(&mut self) -> bool {
        let changed = self.store.update(|s| s.is_expanded = false);
        if changed && let Some(on_collapse) = self.on_collapse.as_mut() {
            on_collapse();
        }
        changed
    }

    /// Flip between expanded and collapsed.
    pub fn toggle(&mut self) -> bool {
        if self.is_expanded() { self.collapse() } else { self.expand() }
    }

    /// Drop listeners and callbacks.
    pub fn destroy(&mut self) {
        self.store.destroy();
        self.on_expand = None;
        self.on_collapse = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[test]
    fn callbacks_fire_on_transitions_only() {
        let expands = Arc::new(AtomicUsize::new(0));
        let collapses = Arc::new(AtomicUsize::new(0));
        let (e, c) = (Arc::clone(&expands), Arc::clone(&collapses));
        let mut disclosure = Disclosure::new(false)
            .with_on_expand(move || {
                e.fetch_add(1, Ordering::SeqCst);
            })
            .with_on_collapse(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });

        assert!(disclosure.expand());
        assert!(!disclosure.expand());
        assert!(disclosure.toggle());
        assert!(!disclosure.collapse());

        assert_eq!(expands.load(Ordering::SeqCst), 1);
        assert_eq!(collapses.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn destroyed_disclosure_ignores_actions() {
        let mut disclosure = Disclosure::new(true);
        disclosure.destroy();
        assert!(!disclosure.collapse());
        assert!(disclosure.is_expanded());
    }
}
