//! Scroll-aware floating action button with a speed-dial menu.
//!
//! The host reports scroll offsets through
//! [`FloatingActionButton::set_scroll_position`]. The direction comes from
//! the delta to the previous offset, and the button shows once the offset
//! reaches the threshold unless it is scrolling down with hiding enabled.
//! Manual `show`/`hide`/`toggle` hold until the next scroll report.

use std::fmt;

use serde::Serialize;
use tessera_core::{BusEvent, EventBus, Pattern, Store, SubscriptionId};

/// Direction of the last scroll movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScrollDirection {
    /// Offset decreased.
    Up,
    /// Offset increased.
    Down,
}

/// Snapshot of a [`FloatingActionButton`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FabState {
    /// Whether the button is shown.
    pub is_visible: bool,
    /// Last reported scroll offset.
    pub scroll_position: f64,
    /// Direction of the last movement, `None` if the offset did not change.
    pub scroll_direction: Option<ScrollDirection>,
    /// Offset at which the button starts showing.
    pub threshold: f64,
    /// Whether scrolling down hides the button.
    pub hide_on_scroll_down: bool,
    /// Whether the speed-dial actions are open.
    pub is_expanded: bool,
}

impl FabState {
    /// Visibility implied by the scroll policy.
    pub fn derived_visibility(&self) -> bool {
        let hidden_by_direction =
            self.hide_on_scroll_down && self.scroll_direction == Some(ScrollDirection::Down);
        self.scroll_position >= self.threshold && !hidden_by_direction
    }
}

/// Discrete button occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FabEvent {
    /// The button became visible.
    Shown,
    /// The button became hidden.
    Hidden,
    /// The speed-dial opened.
    Expanded,
    /// The speed-dial closed.
    Collapsed,
}

impl FabEvent {
    /// Kind of [`FabEvent::Shown`].
    pub const SHOWN: &'static str = "fab:shown";
    /// Kind of [`FabEvent::Hidden`].
    pub const HIDDEN: &'static str = "fab:hidden";
    /// Kind of [`FabEvent::Expanded`].
    pub const EXPANDED: &'static str = "fab:expanded";
    /// Kind of [`FabEvent::Collapsed`].
    pub const COLLAPSED: &'static str = "fab:collapsed";
}

impl BusEvent for FabEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::Shown => Self::SHOWN,
            Self::Hidden => Self::HIDDEN,
            Self::Expanded => Self::EXPANDED,
            Self::Collapsed => Self::COLLAPSED,
        }
    }
}

/// Construction options for [`FloatingActionButton`].
pub struct FabOptions {
    /// Offset at which the button starts showing. Must be non-negative.
    pub threshold: f64,
    /// Whether scrolling down hides the button.
    pub hide_on_scroll_down: bool,
    on_visibility_change: Option<Box<dyn FnMut(bool) + Send>>,
    on_expanded_change: Option<Box<dyn FnMut(bool) + Send>>,
}

impl FabOptions {
    /// Default visibility threshold in pixels.
    pub const DEFAULT_THRESHOLD: f64 = 100.0;

    /// Set the threshold.
    #[must_use]
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set whether scrolling down hides the button.
    #[must_use]
    pub fn hide_on_scroll_down(mut self, hide: bool) -> Self {
        self.hide_on_scroll_down = hide;
        self
    }

    /// Called with the new visibility after every change.
    #[must_use]
    pub fn with_on_visibility_change(mut self, f: impl FnMut(bool) + Send + 'static) -> Self {
        self.on_visibility_change = Some(Box::new(f));
        self
    }

    /// Called when the speed-dial opens or closes.
    #[must_use]
    pub fn with_on_expanded_change(mut self, f: impl FnMut(bool) + Send + 'static) -> Self {
        self.on_expanded_change = Some(Box::new(f));
        self
    }
}

impl Default for FabOptions {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            hide_on_scroll_down: true,
            on_visibility_change: None,
            on_expanded_change: None,
        }
    }
}

impl fmt::Debug for FabOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FabOptions")
            .field("threshold", &self.threshold)
            .field("hide_on_scroll_down", &self.hide_on_scroll_down)
            .finish_non_exhaustive()
    }
}

/// Floating action button engine.
pub struct FloatingActionButton {
    store: Store<FabState>,
    events: EventBus<FabEvent>,
    on_visibility_change: Option<Box<dyn FnMut(bool) + Send>>,
    on_expanded_change: Option<Box<dyn FnMut(bool) + Send>>,
}

impl fmt::Debug for FloatingActionButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FloatingActionButton")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl Default for FloatingActionButton {
    fn default() -> Self {
        Self::new(FabOptions::default())
    }
}

impl FloatingActionButton {
    /// Create a button at scroll offset zero.
    ///
    /// An invalid threshold is replaced by the default.
    pub fn new(options: FabOptions) -> Self {
        let FabOptions { threshold, hide_on_scroll_down, on_visibility_change, on_expanded_change } =
            options;
        let threshold = if valid_threshold(threshold) {
            threshold
        } else {
            tracing::warn!(threshold, "invalid fab threshold, using default");
            FabOptions::DEFAULT_THRESHOLD
        };

        let mut state = FabState {
            is_visible: false,
            scroll_position: 0.0,
            scroll_direction: None,
            threshold,
            hide_on_scroll_down,
            is_expanded: false,
        };
        state.is_visible = state.derived_visibility();
        Self {
            store: Store::new(state),
            events: EventBus::new(),
            on_visibility_change,
            on_expanded_change,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> &FabState {
        self.store.state()
    }

    /// Register a state listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&FabState) + Send + 'static) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a state listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Event channel.
    pub fn events_mut(&mut self) -> &mut EventBus<FabEvent> {
        &mut self.events
    }

    /// Report a new scroll offset and re-derive direction and visibility.
    pub fn set_scroll_position(&mut self, position: f64) -> bool {
        if !position.is_finite() {
            tracing::warn!(position, "ignoring non-finite scroll position");
            return false;
        }
        let was_visible = self.store.state().is_visible;
        let changed = self.store.update(|s| {
            s.scroll_direction = if position > s.scroll_position {
                Some(ScrollDirection::Down)
            } else if position < s.scroll_position {
                Some(ScrollDirection::Up)
            } else {
                None
            };
            s.scroll_position = position;
            s.is_visible = s.derived_visibility();
        });
        self.after_visibility(was_visible);
        changed
    }

    /// Show the button until the next scroll report.
    pub fn show(&mut self) -> bool {
        self.set_visible(true)
    }

    /// Hide the button until the next scroll report.
    pub fn hide(&mut self) -> bool {
        self.set_visible(false)
    }

    /// Flip visibility until the next scroll report.
    pub fn toggle(&mut self) -> bool {
        let visible = self.store.state().is_visible;
        self.set_visible(!visible)
    }

    /// Open the speed-dial.
    pub fn expand_actions(&mut self) -> bool {
        self.set_expanded(true)
    }

    /// Close the speed-dial.
    pub fn collapse_actions(&mut self) -> bool {
        self.set_expanded(false)
    }

    /// Flip the speed-dial.
    pub fn toggle_actions(&mut self) -> bool {
        let expanded = self.store.state().is_expanded;
        self.set_expanded(!expanded)
    }

    /// Change the threshold and re-derive visibility.
    ///
    /// Negative or non-finite thresholds are ignored.
    pub fn set_threshold(&mut self, threshold: f64) -> bool {
        if !valid_threshold(threshold) {
            tracing::warn!(threshold, "ignoring invalid fab threshold");
            return false;
        }
        self.repolicy(|s| s.threshold = threshold)
    }

    /// Change whether scrolling down hides the button and re-derive
    /// visibility.
    pub fn set_hide_on_scroll_down(&mut self, hide: bool) -> bool {
        self.repolicy(|s| s.hide_on_scroll_down = hide)
    }

    /// Release listeners and handlers. Idempotent.
    pub fn destroy(&mut self) {
        self.store.destroy();
        self.events.close();
        self.on_visibility_change = None;
        self.on_expanded_change = None;
    }

    /// Whether [`FloatingActionButton::destroy`] has been called.
    pub fn is_destroyed(&self) -> bool {
        self.store.is_destroyed()
    }

    fn repolicy(&mut self, f: impl FnOnce(&mut FabState)) -> bool {
        let was_visible = self.store.state().is_visible;
        let changed = self.store.update(|s| {
            f(s);
            s.is_visible = s.derived_visibility();
        });
        self.after_visibility(was_visible);
        changed
    }

    fn set_visible(&mut self, is_visible: bool) -> bool {
        let was_visible = self.store.state().is_visible;
        let changed = self.store.update(|s| s.is_visible = is_visible);
        self.after_visibility(was_visible);
        changed
    }

    fn after_visibility(&mut self, was_visible: bool) {
        if self.store.is_destroyed() {
            return;
        }
        let is_visible = self.store.state().is_visible;
        if is_visible == was_visible {
            return;
        }
        if let Some(on_visibility_change) = self.on_visibility_change.as_mut() {
            on_visibility_change(is_visible);
        }
        self.events.emit(&if is_visible { FabEvent::Shown } else { FabEvent::Hidden });
    }

    fn set_expanded(&mut self, is_expanded: bool) -> bool {
        let changed = self.store.update(|s| s.is_expanded = is_expanded);
        if changed {
            if let Some(on_expanded_change) = self.on_expanded_change.as_mut() {
                on_expanded_change(is_expanded);
            }
            self.events.emit(&if is_expanded { FabEvent::Expanded } else { FabEvent::Collapsed });
        }
        changed
    }
}

fn valid_threshold(threshold: f64) -> bool {
    threshold.is_finite() && threshold >= 0.0
}

impl Pattern for FloatingActionButton {
    type State = FabState;

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

    fn recorded(fab: &mut FloatingActionButton) -> Arc<Mutex<Vec<&'static str>>> {
        let kinds = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&kinds);
        fab.events_mut().on_any(move |event: &FabEvent| sink.lock().unwrap().push(event.kind()));
        kinds
    }

    #[test]
    fn hidden_below_threshold() {
        let mut fab = FloatingActionButton::default();
        assert!(!fab.state().is_visible);
        fab.set_scroll_position(50.0);
        assert_eq!(fab.state().scroll_direction, Some(ScrollDirection::Down));
        assert!(!fab.state().is_visible);
    }

    #[test]
    fn scrolling_down_past_threshold_stays_hidden_then_up_shows() {
        let mut fab = FloatingActionButton::default();
        let kinds = recorded(&mut fab);
        fab.set_scroll_position(300.0);
        assert!(!fab.state().is_visible);
        fab.set_scroll_position(250.0);
        assert_eq!(fab.state().scroll_direction, Some(ScrollDirection::Up));
        assert!(fab.state().is_visible);
        assert_eq!(*kinds.lock().unwrap(), vec![FabEvent::SHOWN]);
    }

    #[test]
    fn unchanged_position_clears_direction() {
        let mut fab = FloatingActionButton::new(FabOptions::default().hide_on_scroll_down(false));
        fab.set_scroll_position(200.0);
        assert!(fab.state().is_visible);
        fab.set_scroll_position(200.0);
        assert_eq!(fab.state().scroll_direction, None);
        assert!(fab.state().is_visible);
    }

    #[test]
    fn manual_override_lasts_until_next_scroll() {
        let mut fab = FloatingActionButton::default();
        assert!(fab.show());
        assert!(fab.state().is_visible);
        fab.set_scroll_position(10.0);
        assert!(!fab.state().is_visible);
        assert!(fab.toggle());
        assert!(fab.state().is_visible);
    }

    #[test]
    fn threshold_changes_rederive_visibility() {
        let mut fab = FloatingActionButton::new(FabOptions::default().threshold(0.0));
        assert!(fab.state().is_visible);
        assert!(fab.set_threshold(500.0));
        assert!(!fab.state().is_visible);
        assert!(!fab.set_threshold(-1.0));
        assert!((fab.state().threshold - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_initial_threshold_uses_default() {
        let fab = FloatingActionButton::new(FabOptions::default().threshold(f64::NAN));
        assert!((fab.state().threshold - FabOptions::DEFAULT_THRESHOLD).abs() < f64::EPSILON);
    }

    #[test]
    fn speed_dial_events() {
        let expanded = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&expanded);
        let mut fab = FloatingActionButton::new(
            FabOptions::default().with_on_expanded_change(move |e| sink.lock().unwrap().push(e)),
        );
        let kinds = recorded(&mut fab);
        assert!(fab.toggle_actions());
        assert!(!fab.expand_actions());
        assert!(fab.collapse_actions());
        assert_eq!(*expanded.lock().unwrap(), vec![true, false]);
        assert_eq!(*kinds.lock().unwrap(), vec![FabEvent::EXPANDED, FabEvent::COLLAPSED]);
    }

    #[test]
    fn destroyed_button_ignores_input() {
        let mut fab = FloatingActionButton::default();
        fab.destroy();
        assert!(!fab.set_scroll_position(400.0));
        assert!(!fab.show());
        assert!(fab.is_destroyed());
    }
}
