//! Priority-ordered modal stack.
//!
//! Every open modal is an entry in a stack sorted by priority, highest
//! first, with ties kept in insertion order. The entry at index 0 is the top
//! modal and the only one that receives Escape. Each entry owns a
//! [`DialogBehavior`] that is opened, updated and destroyed together with
//! its stack membership.

use std::{collections::HashMap, fmt};

use serde::Serialize;
use tessera_core::{BusEvent, EventBus, Pattern, Store, SubscriptionId, behaviors::DialogBehavior};

/// One open modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalEntry<C> {
    /// Unique modal id.
    pub id: String,
    /// Content to render.
    pub content: C,
    /// Higher priorities sit above lower ones.
    pub priority: i32,
    /// Whether Escape closes this modal while it is on top.
    pub close_on_escape: bool,
    /// Whether clicking this modal's backdrop closes it.
    pub close_on_backdrop_click: bool,
    #[serde(skip)]
    order: u64,
}

/// Snapshot of a [`Modal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalState<C> {
    /// Open modals, top first.
    pub stack: Vec<ModalEntry<C>>,
    /// Id of `stack[0]`.
    pub top_modal_id: Option<String>,
}

impl<C> ModalState<C> {
    /// Ids in stack order.
    pub fn ids(&self) -> Vec<String> {
        self.stack.iter().map(|entry| entry.id.clone()).collect()
    }
}

/// Parameters for [`Modal::open_modal_with_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalConfig<C> {
    /// Unique modal id.
    pub id: String,
    /// Content to render.
    pub content: C,
    /// Stack priority.
    pub priority: i32,
    /// Whether Escape closes the modal.
    pub close_on_escape: bool,
    /// Whether a backdrop click closes the modal.
    pub close_on_backdrop_click: bool,
}

impl<C> ModalConfig<C> {
    /// Priority 0, closable by Escape and backdrop click.
    pub fn new(id: impl Into<String>, content: C) -> Self {
        Self {
            id: id.into(),
            content,
            priority: 0,
            close_on_escape: true,
            close_on_backdrop_click: true,
        }
    }

    /// Set the priority.
    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set whether Escape closes the modal.
    #[must_use]
    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.close_on_escape = close;
        self
    }

    /// Set whether a backdrop click closes the modal.
    #[must_use]
    pub fn close_on_backdrop_click(mut self, close: bool) -> Self {
        self.close_on_backdrop_click = close;
        self
    }
}

/// Discrete modal occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalEvent {
    /// A modal joined the stack.
    Opened {
        /// Modal id.
        id: String,
    },
    /// A modal left the stack.
    Closed {
        /// Modal id.
        id: String,
    },
    /// Escape was pressed while this modal was on top.
    EscapePressed {
        /// Top modal id.
        id: String,
    },
    /// A modal's backdrop was clicked.
    BackdropClicked {
        /// Modal id.
        id: String,
    },
    /// Stack membership or order changed.
    StackChanged {
        /// Ids in the new stack order.
        ids: Vec<String>,
    },
}

impl ModalEvent {
    /// Kind of [`ModalEvent::Opened`].
    pub const OPENED: &'static str = "modal:opened";
    /// Kind of [`ModalEvent::Closed`].
    pub const CLOSED: &'static str = "modal:closed";
    /// Kind of [`ModalEvent::EscapePressed`].
    pub const ESCAPE_PRESSED: &'static str = "modal:escape-pressed";
    /// Kind of [`ModalEvent::BackdropClicked`].
    pub const BACKDROP_CLICKED: &'static str = "modal:backdrop-clicked";
    /// Kind of [`ModalEvent::StackChanged`].
    pub const STACK_CHANGED: &'static str = "stack:changed";
}

impl BusEvent for ModalEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::Opened { .. } => Self::OPENED,
            Self::Closed { .. } => Self::CLOSED,
            Self::EscapePressed { .. } => Self::ESCAPE_PRESSED,
            Self::BackdropClicked { .. } => Self::BACKDROP_CLICKED,
            Self::StackChanged { .. } => Self::STACK_CHANGED,
        }
    }
}

type IdCallback = Box<dyn FnMut(&str) + Send>;
type StackCallback = Box<dyn FnMut(&[String]) + Send>;

/// Construction options for [`Modal`].
#[derive(Default)]
pub struct ModalOptions {
    on_modal_opened: Option<IdCallback>,
    on_modal_closed: Option<IdCallback>,
    on_stack_change: Option<StackCallback>,
}

impl fmt::Debug for ModalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalOptions").finish_non_exhaustive()
    }
}

impl ModalOptions {
    /// Called with the id of every newly opened modal.
    #[must_use]
    pub fn with_on_modal_opened(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_modal_opened = Some(Box::new(f));
        self
    }

    /// Called with the id of every closed modal.
    #[must_use]
    pub fn with_on_modal_closed(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_modal_closed = Some(Box::new(f));
        self
    }

    /// Called with the stack ids, top first, after every stack change.
    #[must_use]
    pub fn with_on_stack_change(mut self, f: impl FnMut(&[String]) + Send + 'static) -> Self {
        self.on_stack_change = Some(Box::new(f));
        self
    }
}

/// Modal stack engine.
pub struct Modal<C> {
    store: Store<ModalState<C>>,
    events: EventBus<ModalEvent>,
    dialogs: HashMap<String, DialogBehavior<C>>,
    next_order: u64,
    on_modal_opened: Option<IdCallback>,
    on_modal_closed: Option<IdCallback>,
    on_stack_change: Option<StackCallback>,
}

impl<C: fmt::Debug> fmt::Debug for Modal<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modal")
            .field("store", &self.store)
            .field("dialogs", &self.dialogs.len())
            .finish_non_exhaustive()
    }
}

impl<C> Default for Modal<C>
where
    C: Clone + PartialEq,
{
    fn default() -> Self {
        Self::new(ModalOptions::default())
    }
}

impl<C> Modal<C>
where
    C: Clone + PartialEq,
{
    /// Create an empty stack.
    pub fn new(options: ModalOptions) -> Self {
        let ModalOptions { on_modal_opened, on_modal_closed, on_stack_change } = options;
        Self {
            store: Store::new(ModalState { stack: Vec::new(), top_modal_id: None }),
            events: EventBus::new(),
            dialogs: HashMap::new(),
            next_order: 0,
            on_modal_opened,
            on_modal_closed,
            on_stack_change,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> &ModalState<C> {
        self.store.state()
    }

    /// Register a state listener.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&ModalState<C>) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a state listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Event channel.
    pub fn events_mut(&mut self) -> &mut EventBus<ModalEvent> {
        &mut self.events
    }

    /// Whether a modal with `id` is in the stack.
    pub fn is_open(&self, id: &str) -> bool {
        self.modal(id).is_some()
    }

    /// The stack entry for `id`.
    pub fn modal(&self, id: &str) -> Option<&ModalEntry<C>> {
        self.store.state().stack.iter().find(|entry| entry.id == id)
    }

    /// The top modal.
    pub fn top_modal(&self) -> Option<&ModalEntry<C>> {
        self.store.state().stack.first()
    }

    /// Open `id` with default flags.
    pub fn open_modal(&mut self, id: impl Into<String>, content: C, priority: i32) -> bool {
        self.open_modal_with_config(ModalConfig::new(id, content).priority(priority))
    }

    /// Open a modal, or update it in place if `config.id` is already open.
    ///
    /// An update keeps the entry's original insertion order for tie-breaking
    /// and re-sorts the stack.
    pub fn open_modal_with_config(&mut self, config: ModalConfig<C>) -> bool {
        if self.store.is_destroyed() {
            return false;
        }
        let ModalConfig { id, content, priority, close_on_escape, close_on_backdrop_click } =
            config;
        let previous_ids = self.store.state().ids();
        let is_new = !self.is_open(&id);
        let order = if is_new {
            let order = self.next_order;
            self.next_order += 1;
            order
        } else {
            self.modal(&id).map_or(0, |entry| entry.order)
        };

        let entry = ModalEntry {
            id: id.clone(),
            content: content.clone(),
            priority,
            close_on_escape,
            close_on_backdrop_click,
            order,
        };
        let changed = self.store.update(|s| {
            match s.stack.iter_mut().find(|existing| existing.id == entry.id) {
                Some(existing) => *existing = entry,
                None => s.stack.push(entry),
            }
            sort_stack(s);
        });

        self.dialogs.entry(id.clone()).or_default().open(content);

        if is_new {
            tracing::debug!(id, priority, "modal opened");
            if let Some(on_modal_opened) = self.on_modal_opened.as_mut() {
                on_modal_opened(&id);
            }
            self.events.emit(&ModalEvent::Opened { id });
        }
        self.notify_stack_if_changed(&previous_ids);
        changed
    }

    /// Close the modal with `id`.
    pub fn close_modal(&mut self, id: &str) -> bool {
        if self.store.is_destroyed() {
            return false;
        }
        if !self.is_open(id) {
            tracing::warn!(id, "cannot close modal that is not open");
            return false;
        }
        let previous_ids = self.store.state().ids();
        self.store.update(|s| {
            s.stack.retain(|entry| entry.id != id);
            sort_stack(s);
        });
        if let Some(mut dialog) = self.dialogs.remove(id) {
            dialog.close();
            dialog.destroy();
        }

        tracing::debug!(id, "modal closed");
        self.notify_closed(id);
        self.notify_stack_if_changed(&previous_ids);
        true
    }

    /// Close the top modal.
    pub fn close_top_modal(&mut self) -> bool {
        match self.store.state().top_modal_id.clone() {
            Some(id) => self.close_modal(&id),
            None => false,
        }
    }

    /// Close every modal in one state update.
    pub fn close_all_modals(&mut self) -> bool {
        let previous_ids = self.store.state().ids();
        if previous_ids.is_empty() || self.store.is_destroyed() {
            return false;
        }
        self.store.update(|s| {
            s.stack.clear();
            s.top_modal_id = None;
        });
        for (_, mut dialog) in self.dialogs.drain() {
            dialog.destroy();
        }
        for id in &previous_ids {
            self.notify_closed(id);
        }
        self.notify_stack_if_changed(&previous_ids);
        true
    }

    /// Report an Escape key press.
    ///
    /// Always emits `modal:escape-pressed` for the top modal, and closes it
    /// only if its `close_on_escape` flag is set. Returns `true` if a modal
    /// closed.
    pub fn handle_escape_key(&mut self) -> bool {
        let Some(top) = self.top_modal() else { return false };
        let id = top.id.clone();
        let close = top.close_on_escape;
        self.events.emit(&ModalEvent::EscapePressed { id: id.clone() });
        close && self.close_modal(&id)
    }

    /// Report a click on the backdrop of modal `id`, which need not be on
    /// top.
    ///
    /// Emits `modal:backdrop-clicked`, and closes the modal only if its
    /// `close_on_backdrop_click` flag is set. Returns `true` if it closed.
    pub fn handle_backdrop_click(&mut self, id: &str) -> bool {
        let Some(entry) = self.modal(id) else {
            tracing::warn!(id, "backdrop click for modal that is not open");
            return false;
        };
        let close = entry.close_on_backdrop_click;
        self.events.emit(&ModalEvent::BackdropClicked { id: id.to_string() });
        close && self.close_modal(id)
    }

    /// Release listeners, handlers and every dialog. Idempotent.
    pub fn destroy(&mut self) {
        for (_, mut dialog) in self.dialogs.drain() {
            dialog.destroy();
        }
        self.store.destroy();
        self.events.close();
        self.on_modal_opened = None;
        self.on_modal_closed = None;
        self.on_stack_change = None;
    }

    /// Whether [`Modal::destroy`] has been called.
    pub fn is_destroyed(&self) -> bool {
        self.store.is_destroyed()
    }

    /// Whether the dialog owned by modal `id` is open.
    pub fn dialog_is_open(&self, id: &str) -> bool {
        self.dialogs.get(id).is_some_and(DialogBehavior::is_open)
    }

    fn notify_closed(&mut self, id: &str) {
        if let Some(on_modal_closed) = self.on_modal_closed.as_mut() {
            on_modal_closed(id);
        }
        self.events.emit(&ModalEvent::Closed { id: id.to_string() });
    }

    fn notify_stack_if_changed(&mut self, previous_ids: &[String]) {
        let ids = self.store.state().ids();
        if ids == previous_ids {
            return;
        }
        if let Some(on_stack_change) = self.on_stack_change.as_mut() {
            on_stack_change(&ids);
        }
        self.events.emit(&ModalEvent::StackChanged { ids });
    }
}

/// Stable sort by priority, highest first, then refresh the top id.
fn sort_stack<C>(state: &mut ModalState<C>) {
    state
        .stack
        .sort_by(|a, b| b.priority.cmp(&a.priority).then(a.order.cmp(&b.order)));
    state.top_modal_id = state.stack.first().map(|entry| entry.id.clone());
}

impl<C> Pattern for Modal<C>
where
    C: Clone + PartialEq + 'static,
{
    type State = ModalState<C>;

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
