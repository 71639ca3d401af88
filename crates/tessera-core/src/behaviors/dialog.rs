//! Open/close dialog carrying a content payload.

use serde::Serialize;

use crate::{Store, SubscriptionId};

/// Snapshot of a [`DialogBehavior`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogState<C> {
    /// Whether the dialog is showing.
    pub is_open: bool,
    /// Content shown while open. Cleared on close.
    pub content: Option<C>,
}

/// Dialog open/close behavior.
#[derive(Debug)]
pub struct DialogBehavior<C> {
    store: Store<DialogState<C>>,
}

impl<C> Default for DialogBehavior<C>
where
    C: Clone + PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> DialogBehavior<C>
where
    C: Clone + PartialEq,
{
    /// Create a closed dialog.
    pub fn new() -> Self {
        Self { store: Store::new(DialogState { is_open: false, content: None }) }
    }

    /// Current snapshot.
    pub fn state(&self) -> &DialogState<C> {
        self.store.state()
    }

    /// Whether the dialog is open.
    pub fn is_open(&self) -> bool {
        self.store.state().is_open
    }

    /// Register a state listener.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&DialogState<C>) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Open with `content`, replacing any content already shown.
    pub fn open(&mut self, content: C) -> bool {
        self.store.replace(DialogState { is_open: true, content: Some(content) })
    }

    /// Close and clear content.
    pub fn close(&mut self) -> bool {
        self.store.replace(DialogState { is_open: false, content: None })
    }

    /// Drop listeners and stop accepting updates.
    pub fn destroy(&mut self) {
        self.store.destroy();
    }

    /// Whether [`DialogBehavior::destroy`] has been called.
    pub fn is_destroyed(&self) -> bool {
        self.store.is_destroyed()
    }
}
