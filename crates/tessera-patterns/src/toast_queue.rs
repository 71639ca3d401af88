//! Transient notification queue with timed expiry.
//!
//! The queue is sans-IO. Every toast gets exactly one deadline when it is
//! added, kept in an `id -> deadline` map owned by the engine. The host
//! asks [`ToastQueue::next_deadline`] when to wake up and calls
//! [`ToastQueue::handle_tick`] once that time has passed; expired toasts are
//! removed then. Removing a toast by hand drops its deadline, so it can
//! never be removed a second time by expiry.
//!
//! Hosts without their own timer loop can await [`ToastQueue::run_expiries`],
//! which sleeps on the queue's [`Environment`] until every pending toast has
//! expired.
//!
//! `max_visible` is advisory. All toasts stay in state and
//! [`ToastQueue::visible_toasts`] applies the limit at display time.

use std::{collections::HashMap, fmt, time::Duration};

use serde::{Serialize, Serializer};
use tessera_core::{Environment, Pattern, Store, SubscriptionId};

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToastKind {
    /// Neutral information.
    #[default]
    Info,
    /// A completed operation.
    Success,
    /// Something needs attention.
    Warning,
    /// An operation failed.
    Error,
}

/// Screen corner or edge where toasts stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToastPosition {
    /// Top left corner.
    TopLeft,
    /// Top edge, centered.
    TopCenter,
    /// Top right corner.
    TopRight,
    /// Bottom left corner.
    BottomLeft,
    /// Bottom edge, centered.
    BottomCenter,
    /// Bottom right corner.
    #[default]
    BottomRight,
}

/// Input to [`ToastQueue::add_toast`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastData {
    /// Body text.
    pub message: String,
    /// Optional heading.
    pub title: Option<String>,
    /// Severity.
    pub kind: ToastKind,
    /// Lifetime. Defaults to the queue's default duration.
    pub duration: Option<Duration>,
}

impl ToastData {
    /// Info toast with the queue's default duration.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), title: None, kind: ToastKind::Info, duration: None }
    }

    /// Set the heading.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the severity.
    #[must_use]
    pub fn kind(mut self, kind: ToastKind) -> Self {
        self.kind = kind;
        self
    }

    /// Override the lifetime.
    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// A toast in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    /// Unique id.
    pub id: String,
    /// Body text.
    pub message: String,
    /// Optional heading.
    pub title: Option<String>,
    /// Severity.
    pub kind: ToastKind,
    /// Lifetime from creation.
    #[serde(serialize_with = "as_millis")]
    pub duration: Duration,
    /// Wall-clock creation time in milliseconds since the Unix epoch.
    pub created_at: u64,
}

/// Snapshot of a [`ToastQueue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastQueueState {
    /// Live toasts, oldest first.
    pub toasts: Vec<Toast>,
    /// How many toasts a view should show at once.
    pub max_visible: usize,
    /// Lifetime for toasts without an override.
    #[serde(serialize_with = "as_millis")]
    pub default_duration: Duration,
    /// Where toasts stack.
    pub position: ToastPosition,
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

type ToastCallback = Box<dyn FnMut(&Toast) + Send>;

/// Construction options for [`ToastQueue`].
pub struct ToastQueueOptions {
    /// How many toasts a view should show at once.
    pub max_visible: usize,
    /// Lifetime for toasts without an override.
    pub default_duration: Duration,
    /// Where toasts stack.
    pub position: ToastPosition,
    on_toast_added: Option<ToastCallback>,
    on_toast_removed: Option<ToastCallback>,
    on_position_changed: Option<Box<dyn FnMut(ToastPosition) + Send>>,
}

impl ToastQueueOptions {
    /// Default display limit.
    pub const DEFAULT_MAX_VISIBLE: usize = 5;
    /// Default toast lifetime.
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(5);

    /// Set the display limit.
    #[must_use]
    pub fn max_visible(mut self, max_visible: usize) -> Self {
        self.max_visible = max_visible;
        self
    }

    /// Set the default lifetime.
    #[must_use]
    pub fn default_duration(mut self, duration: Duration) -> Self {
        self.default_duration = duration;
        self
    }

    /// Set the position.
    #[must_use]
    pub fn position(mut self, position: ToastPosition) -> Self {
        self.position = position;
        self
    }

    /// Called after every toast is added.
    #[must_use]
    pub fn with_on_toast_added(mut self, f: impl FnMut(&Toast) + Send + 'static) -> Self {
        self.on_toast_added = Some(Box::new(f));
        self
    }

    /// Called once for every toast removed, whether by expiry, by hand, or
    /// by clearing.
    #[must_use]
    pub fn with_on_toast_removed(mut self, f: impl FnMut(&Toast) + Send + 'static) -> Self {
        self.on_toast_removed = Some(Box::new(f));
        self
    }

    /// Called after the position changes.
    #[must_use]
    pub fn with_on_position_changed(
        mut self,
        f: impl FnMut(ToastPosition) + Send + 'static,
    ) -> Self {
        self.on_position_changed = Some(Box::new(f));
        self
    }
}

impl Default for ToastQueueOptions {
    fn default() -> Self {
        Self {
            max_visible: Self::DEFAULT_MAX_VISIBLE,
            default_duration: Self::DEFAULT_DURATION,
            position: ToastPosition::default(),
            on_toast_added: None,
            on_toast_removed: None,
            on_position_changed: None,
        }
    }
}

impl fmt::Debug for ToastQueueOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastQueueOptions")
            .field("max_visible", &self.max_visible)
            .field("default_duration", &self.default_duration)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

/// Toast queue engine.
pub struct ToastQueue<E: Environment> {
    env: E,
    store: Store<ToastQueueState>,
    deadlines: HashMap<String, E::Instant>,
    next_id: u64,
    on_toast_added: Option<ToastCallback>,
    on_toast_removed: Option<ToastCallback>,
    on_position_changed: Option<Box<dyn FnMut(ToastPosition) + Send>>,
}

impl<E: Environment> fmt::Debug for ToastQueue<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastQueue")
            .field("store", &self.store)
            .field("deadlines", &self.deadlines)
            .finish_non_exhaustive()
    }
}

impl<E: Environment> ToastQueue<E> {
    /// Create an empty queue reading time from `env`.
    pub fn new(env: E, options: ToastQueueOptions) -> Self {
        let ToastQueueOptions {
            max_visible,
            default_duration,
            position,
            on_toast_added,
            on_toast_removed,
            on_position_changed,
        } = options;
        let state = ToastQueueState { toasts: Vec::new(), max_visible, default_duration, position };
        Self {
            env,
            store: Store::new(state),
            deadlines: HashMap::new(),
            next_id: 0,
            on_toast_added,
            on_toast_removed,
            on_position_changed,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> &ToastQueueState {
        self.store.state()
    }

    /// Register a state listener.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&ToastQueueState) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a state listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// The newest `max_visible` toasts, oldest first.
    pub fn visible_toasts(&self) -> &[Toast] {
        let state = self.store.state();
        let skip = state.toasts.len().saturating_sub(state.max_visible);
        &state.toasts[skip..]
    }

    /// Earliest pending expiry.
    pub fn next_deadline(&self) -> Option<E::Instant> {
        self.deadlines.values().min().copied()
    }

    /// Time left until the earliest pending expiry, zero if already due.
    pub fn time_until_next_deadline(&self) -> Option<Duration> {
        let deadline = self.next_deadline()?;
        let now = self.env.now();
        Some(if deadline > now { deadline - now } else { Duration::ZERO })
    }

    /// Add a toast and schedule its expiry. Returns the new id.
    ///
    /// Returns `None` once the queue is destroyed.
    pub fn add_toast(&mut self, data: ToastData) -> Option<String> {
        if self.store.is_destroyed() {
            return None;
        }
        let ToastData { message, title, kind, duration } = data;
        let duration = duration.unwrap_or(self.store.state().default_duration);
        let created_at = self.env.wall_clock_millis();
        let id = format!("toast-{}-{created_at}", self.next_id);
        self.next_id += 1;

        let toast = Toast { id: id.clone(), message, title, kind, duration, created_at };
        let deadline = self.env.deadline_after(self.env.now(), duration);
        self.deadlines.insert(id.clone(), deadline);
        self.store.update(|s| s.toasts.push(toast.clone()));

        tracing::debug!(id, ?duration, "toast added");
        if let Some(on_toast_added) = self.on_toast_added.as_mut() {
            on_toast_added(&toast);
        }
        Some(id)
    }

    /// Remove the toast with `id` and cancel its expiry.
    pub fn remove_toast(&mut self, id: &str) -> bool {
        let Some(toast) = self.store.state().toasts.iter().find(|t| t.id == id).cloned() else {
            tracing::warn!(id, "cannot remove unknown toast");
            return false;
        };
        self.deadlines.remove(id);
        if !self.store.update(|s| s.toasts.retain(|t| t.id != id)) {
            return false;
        }
        self.notify_removed(&[toast]);
        true
    }

    /// Remove every toast in one update and cancel every expiry.
    pub fn clear_all_toasts(&mut self) -> bool {
        let removed = self.store.state().toasts.clone();
        self.deadlines.clear();
        if !self.store.update(|s| s.toasts.clear()) {
            return false;
        }
        self.notify_removed(&removed);
        true
    }

    /// Remove every toast whose deadline has passed.
    ///
    /// Returns the ids removed, in deadline order.
    pub fn handle_tick(&mut self) -> Vec<String> {
        let now = self.env.now();
        let mut due: Vec<(E::Instant, String)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, deadline)| (*deadline, id.clone()))
            .collect();
        if due.is_empty() {
            return Vec::new();
        }
        due.sort();

        let ids: Vec<String> = due.into_iter().map(|(_, id)| id).collect();
        for id in &ids {
            self.deadlines.remove(id);
        }
        let removed: Vec<Toast> = ids
            .iter()
            .filter_map(|id| self.store.state().toasts.iter().find(|t| t.id == *id).cloned())
            .collect();
        self.store.update(|s| s.toasts.retain(|t| !ids.contains(&t.id)));

        tracing::debug!(count = ids.len(), "toasts expired");
        self.notify_removed(&removed);
        ids
    }

    /// Sleep until each pending expiry and remove the toasts that fall due.
    ///
    /// Returns the ids removed, in expiry order, once no expiry is pending.
    /// Returns at once on an empty or destroyed queue.
    pub async fn run_expiries(&mut self) -> Vec<String> {
        let mut expired = Vec::new();
        while let Some(wait) = self.time_until_next_deadline() {
            if !wait.is_zero() {
                self.env.sleep(wait).await;
            }
            expired.extend(self.handle_tick());
        }
        tracing::trace!(count = expired.len(), "no toast expiries pending");
        expired
    }

    /// Move where toasts stack. Never touches the toasts or their timers.
    pub fn set_position(&mut self, position: ToastPosition) -> bool {
        let changed = self.store.update(|s| s.position = position);
        if changed && let Some(on_position_changed) = self.on_position_changed.as_mut() {
            on_position_changed(position);
        }
        changed
    }

    /// Change the display limit.
    pub fn set_max_visible(&mut self, max_visible: usize) -> bool {
        self.store.update(|s| s.max_visible = max_visible)
    }

    /// Change the lifetime used by later toasts. Live toasts keep theirs.
    pub fn set_default_duration(&mut self, duration: Duration) -> bool {
        self.store.update(|s| s.default_duration = duration)
    }

    /// Cancel every expiry and release listeners. Idempotent.
    pub fn destroy(&mut self) {
        self.deadlines.clear();
        self.store.destroy();
        self.on_toast_added = None;
        self.on_toast_removed = None;
        self.on_position_changed = None;
    }

    /// Whether [`ToastQueue::destroy`] has been called.
    pub fn is_destroyed(&self) -> bool {
        self.store.is_destroyed()
    }

    /// Number of pending expiries.
    pub fn pending_timers(&self) -> usize {
        self.deadlines.len()
    }

    fn notify_removed(&mut self, removed: &[Toast]) {
        if let Some(on_toast_removed) = self.on_toast_removed.as_mut() {
            for toast in removed {
                on_toast_removed(toast);
            }
        }
    }
}

impl<E: Environment> Pattern for ToastQueue<E> {
    type State = ToastQueueState;

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
