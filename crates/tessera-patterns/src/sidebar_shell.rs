//! Collapsible application sidebar.
//!
//! Expansion is a composed [`Disclosure`]. On top of it the shell tracks the
//! active navigation section, a pin flag, a resizable width, and whether the
//! layout is in mobile mode. In mobile mode, choosing a section while the
//! sidebar is expanded collapses it in the same update, so the chosen
//! content is not left covered.

use std::fmt;

use serde::Serialize;
use tessera_core::{BusEvent, EventBus, Pattern, Store, SubscriptionId, behaviors::Disclosure};

/// Snapshot of a [`SidebarShell`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarState {
    /// Whether the sidebar is expanded.
    pub is_expanded: bool,
    /// Selected navigation section.
    pub active_section: Option<String>,
    /// Pinned sidebars push content aside instead of overlaying it.
    pub is_pinned: bool,
    /// Width in pixels, within the configured bounds.
    pub width: f64,
    /// Whether the layout is in mobile mode.
    pub is_mobile: bool,
}

/// Discrete sidebar occurrences.
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarEvent {
    /// The sidebar expanded.
    Expanded,
    /// The sidebar collapsed.
    Collapsed,
    /// The active section changed.
    SectionChanged {
        /// New section.
        section: String,
    },
    /// The pin flag changed.
    PinChanged {
        /// New pin state.
        is_pinned: bool,
    },
    /// The width changed.
    WidthChanged {
        /// New width.
        width: f64,
    },
    /// Mobile mode changed.
    MobileChanged {
        /// New mobile flag.
        is_mobile: bool,
    },
}

impl SidebarEvent {
    /// Kind of [`SidebarEvent::Expanded`].
    pub const EXPANDED: &'static str = "sidebar:expanded";
    /// Kind of [`SidebarEvent::Collapsed`].
    pub const COLLAPSED: &'static str = "sidebar:collapsed";
    /// Kind of [`SidebarEvent::SectionChanged`].
    pub const SECTION_CHANGED: &'static str = "section:changed";
    /// Kind of [`SidebarEvent::PinChanged`].
    pub const PIN_CHANGED: &'static str = "pin:changed";
    /// Kind of [`SidebarEvent::WidthChanged`].
    pub const WIDTH_CHANGED: &'static str = "width:changed";
    /// Kind of [`SidebarEvent::MobileChanged`].
    pub const MOBILE_CHANGED: &'static str = "mobile:changed";
}

impl BusEvent for SidebarEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::Expanded => Self::EXPANDED,
            Self::Collapsed => Self::COLLAPSED,
            Self::SectionChanged { .. } => Self::SECTION_CHANGED,
            Self::PinChanged { .. } => Self::PIN_CHANGED,
            Self::WidthChanged { .. } => Self::WIDTH_CHANGED,
            Self::MobileChanged { .. } => Self::MOBILE_CHANGED,
        }
    }
}

/// Construction options for [`SidebarShell`].
pub struct SidebarOptions {
    /// Whether the sidebar starts expanded.
    pub initially_expanded: bool,
    /// Initially active section.
    pub initial_section: Option<String>,
    /// Whether the sidebar starts pinned.
    pub initially_pinned: bool,
    /// Initial width, clamped into `min_width..=max_width`.
    pub width: f64,
    /// Smallest allowed width.
    pub min_width: f64,
    /// Largest allowed width.
    pub max_width: f64,
    /// Whether the layout starts in mobile mode.
    pub is_mobile: bool,
    on_expanded_change: Option<Box<dyn FnMut(bool) + Send>>,
    on_section_change: Option<Box<dyn FnMut(&str) + Send>>,
}

impl SidebarOptions {
    /// Default width in pixels.
    pub const DEFAULT_WIDTH: f64 = 280.0;
    /// Default minimum width in pixels.
    pub const DEFAULT_MIN_WIDTH: f64 = 200.0;
    /// Default maximum width in pixels.
    pub const DEFAULT_MAX_WIDTH: f64 = 480.0;

    /// Set the initially active section.
    #[must_use]
    pub fn initial_section(mut self, section: impl Into<String>) -> Self {
        self.initial_section = Some(section.into());
        self
    }

    /// Set whether the sidebar starts expanded.
    #[must_use]
    pub fn initially_expanded(mut self, expanded: bool) -> Self {
        self.initially_expanded = expanded;
        self
    }

    /// Set whether the sidebar starts pinned.
    #[must_use]
    pub fn initially_pinned(mut self, pinned: bool) -> Self {
        self.initially_pinned = pinned;
        self
    }

    /// Set the width and its bounds.
    #[must_use]
    pub fn width(mut self, width: f64, min_width: f64, max_width: f64) -> Self {
        self.width = width;
        self.min_width = min_width;
        self.max_width = max_width;
        self
    }

    /// Start in mobile mode.
    #[must_use]
    pub fn mobile(mut self, is_mobile: bool) -> Self {
        self.is_mobile = is_mobile;
        self
    }

    /// Called with the new expansion state after every change.
    #[must_use]
    pub fn with_on_expanded_change(mut self, f: impl FnMut(bool) + Send + 'static) -> Self {
        self.on_expanded_change = Some(Box::new(f));
        self
    }

    /// Called with the new section after every change.
    #[must_use]
    pub fn with_on_section_change(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_section_change = Some(Box::new(f));
        self
    }
}

impl Default for SidebarOptions {
    fn default() -> Self {
        Self {
            initially_expanded: true,
            initial_section: None,
            initially_pinned: false,
            width: Self::DEFAULT_WIDTH,
            min_width: Self::DEFAULT_MIN_WIDTH,
            max_width: Self::DEFAULT_MAX_WIDTH,
            is_mobile: false,
            on_expanded_change: None,
            on_section_change: None,
        }
    }
}

impl fmt::Debug for SidebarOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SidebarOptions")
            .field("initially_expanded", &self.initially_expanded)
            .field("initial_section", &self.initial_section)
            .field("initially_pinned", &self.initially_pinned)
            .field("width", &self.width)
            .field("min_width", &self.min_width)
            .field("max_width", &self.max_width)
            .field("is_mobile", &self.is_mobile)
            .finish_non_exhaustive()
    }
}

/// Sidebar shell engine.
pub struct SidebarShell {
    store: Store<SidebarState>,
    events: EventBus<SidebarEvent>,
    disclosure: Disclosure,
    min_width: f64,
    max_width: f64,
    on_expanded_change: Option<Box<dyn FnMut(bool) + Send>>,
    on_section_change: Option<Box<dyn FnMut(&str) + Send>>,
}

impl fmt::Debug for SidebarShell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SidebarShell")
            .field("store", &self.store)
            .field("min_width", &self.min_width)
            .field("max_width", &self.max_width)
            .finish_non_exhaustive()
    }
}

impl Default for SidebarShell {
    fn default() -> Self {
        Self::new(SidebarOptions::default())
    }
}

impl SidebarShell {
    /// Create a shell from `options`.
    ///
    /// Inverted width bounds are swapped.
    pub fn new(options: SidebarOptions) -> Self {
        let SidebarOptions {
            initially_expanded,
            initial_section,
            initially_pinned,
            width,
            min_width,
            max_width,
            is_mobile,
            on_expanded_change,
            on_section_change,
        } = options;

        let (min_width, max_width) = if min_width <= max_width {
            (min_width, max_width)
        } else {
            tracing::warn!(min_width, max_width, "sidebar width bounds inverted, swapping");
            (max_width, min_width)
        };
        let width = if width.is_finite() { width.clamp(min_width, max_width) } else { min_width };

        let state = SidebarState {
            is_expanded: initially_expanded,
            active_section: initial_section,
            is_pinned: initially_pinned,
            width,
            is_mobile,
        };
        Self {
            store: Store::new(state),
            events: EventBus::new(),
            disclosure: Disclosure::new(initially_expanded),
            min_width,
            max_width,
            on_expanded_change,
            on_section_change,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> &SidebarState {
        self.store.state()
    }

    /// Register a state listener.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&SidebarState) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a state listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Event channel.
    pub fn events_mut(&mut self) -> &mut EventBus<SidebarEvent> {
        &mut self.events
    }

    /// Width bounds as `(min, max)`.
    pub fn width_bounds(&self) -> (f64, f64) {
        (self.min_width, self.max_width)
    }

    /// Expand the sidebar.
    pub fn expand(&mut self) -> bool {
        self.disclosure.expand();
        self.sync_expanded()
    }

    /// Collapse the sidebar.
    pub fn collapse(&mut self) -> bool {
        self.disclosure.collapse();
        self.sync_expanded()
    }

    /// Flip expansion.
    pub fn toggle(&mut self) -> bool {
        self.disclosure.toggle();
        self.sync_expanded()
    }

    /// Select `section`.
    ///
    /// In mobile mode an expanded sidebar collapses as part of this same
    /// update. Outside mobile mode expansion is untouched.
    pub fn set_active_section(&mut self, section: impl Into<String>) -> bool {
        let section = section.into();
        let state = self.store.state();
        let auto_collapse = state.is_mobile && state.is_expanded;
        let section_changed = state.active_section.as_deref() != Some(section.as_str());

        if auto_collapse {
            self.disclosure.collapse();
        }
        let changed = self.store.update(|s| {
            s.active_section = Some(section.clone());
            if auto_collapse {
                s.is_expanded = false;
            }
        });
        if !changed {
            return false;
        }

        if section_changed {
            if let Some(on_section_change) = self.on_section_change.as_mut() {
                on_section_change(&section);
            }
            self.events.emit(&SidebarEvent::SectionChanged { section });
        }
        if auto_collapse {
            tracing::debug!("mobile sidebar collapsed after section change");
            self.notify_expanded(false);
        }
        true
    }

    /// Pin the sidebar.
    pub fn pin(&mut self) -> bool {
        self.set_pinned(true)
    }

    /// Unpin the sidebar.
    pub fn unpin(&mut self) -> bool {
        self.set_pinned(false)
    }

    /// Flip the pin flag.
    pub fn toggle_pin(&mut self) -> bool {
        let pinned = self.store.state().is_pinned;
        self.set_pinned(!pinned)
    }

    /// Resize, clamping into the configured bounds.
    pub fn set_width(&mut self, width: f64) -> bool {
        if !width.is_finite() {
            tracing::warn!(width, "ignoring non-finite sidebar width");
            return false;
        }
        let width = width.clamp(self.min_width, self.max_width);
        let changed = self.store.update(|s| s.width = width);
        if changed {
            self.events.emit(&SidebarEvent::WidthChanged { width });
        }
        changed
    }

    /// Enter or leave mobile mode.
    pub fn set_mobile(&mut self, is_mobile: bool) -> bool {
        let changed = self.store.update(|s| s.is_mobile = is_mobile);
        if changed {
            self.events.emit(&SidebarEvent::MobileChanged { is_mobile });
        }
        changed
    }

    /// Release listeners, handlers and the composed disclosure. Idempotent.
    pub fn destroy(&mut self) {
        self.store.destroy();
        self.events.close();
        self.disclosure.destroy();
        self.on_expanded_change = None;
        self.on_section_change = None;
    }

    /// Whether [`SidebarShell::destroy`] has been called.
    pub fn is_destroyed(&self) -> bool {
        self.store.is_destroyed()
    }

    fn set_pinned(&mut self, is_pinned: bool) -> bool {
        let changed = self.store.update(|s| s.is_pinned = is_pinned);
        if changed {
            self.events.emit(&SidebarEvent::PinChanged { is_pinned });
        }
        changed
    }

    /// Mirror the disclosure into state.
    fn sync_expanded(&mut self) -> bool {
        let is_expanded = self.disclosure.is_expanded();
        let changed = self.store.update(|s| s.is_expanded = is_expanded);
        if changed {
            self.notify_expanded(is_expanded);
        }
        changed
    }

    fn notify_expanded(&mut self, is_expanded: bool) {
        if let Some(on_expanded_change) = self.on_expanded_change.as_mut() {
            on_expanded_change(is_expanded);
        }
        let event = if is_expanded { SidebarEvent::Expanded } else { SidebarEvent::Collapsed };
        self.events.emit(&event);
    }
}

impl Pattern for SidebarShell {
    type State = SidebarState;

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

    fn recorded(shell: &mut SidebarShell) -> Arc<Mutex<Vec<SidebarState>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        shell.subscribe(move |s| sink.lock().unwrap().push(s.clone()));
        seen
    }

    #[test]
    fn defaults() {
        let shell = SidebarShell::default();
        let state = shell.state();
        assert!(state.is_expanded);
        assert!(!state.is_pinned);
        assert!(!state.is_mobile);
        assert!((state.width - 280.0).abs() < f64::EPSILON);
        assert_eq!(shell.width_bounds(), (200.0, 480.0));
    }

    #[test]
    fn mobile_section_change_collapses_in_one_update() {
        let mut shell = SidebarShell::new(SidebarOptions::default().mobile(true));
        let seen = recorded(&mut shell);

        assert!(shell.set_active_section("inbox"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(!seen[0].is_expanded);
        assert_eq!(seen[0].active_section.as_deref(), Some("inbox"));
    }

    #[test]
    fn desktop_section_change_keeps_expansion() {
        let mut shell = SidebarShell::default();
        shell.set_active_section("inbox");
        assert!(shell.state().is_expanded);
    }

    #[test]
    fn collapsed_mobile_sidebar_stays_collapsed() {
        let mut shell = SidebarShell::new(
            SidebarOptions::default().mobile(true).initially_expanded(false),
        );
        shell.set_active_section("inbox");
        assert!(!shell.state().is_expanded);
        shell.expand();
        assert!(shell.state().is_expanded);
    }

    #[test]
    fn width_is_clamped() {
        let mut shell = SidebarShell::default();
        shell.set_width(50.0);
        assert!((shell.state().width - 200.0).abs() < f64::EPSILON);
        shell.set_width(1000.0);
        assert!((shell.state().width - 480.0).abs() < f64::EPSILON);
        assert!(!shell.set_width(f64::NAN));
    }

    #[test]
    fn toggle_and_pin() {
        let mut shell = SidebarShell::default();
        assert!(shell.toggle());
        assert!(!shell.state().is_expanded);
        assert!(shell.toggle_pin());
        assert!(shell.state().is_pinned);
        assert!(!shell.pin());
        assert!(shell.unpin());
    }

    #[test]
    fn callbacks_and_events() {
        let expanded = Arc::new(Mutex::new(Vec::new()));
        let expanded_sink = Arc::clone(&expanded);
        let mut shell = SidebarShell::new(
            SidebarOptions::default()
                .mobile(true)
                .with_on_expanded_change(move |e| expanded_sink.lock().unwrap().push(e)),
        );
        let kinds = Arc::new(Mutex::new(Vec::new()));
        let kinds_sink = Arc::clone(&kinds);
        shell.events_mut().on_any(move |e: &SidebarEvent| kinds_sink.lock().unwrap().push(e.kind()));

        shell.set_active_section("files");
        assert_eq!(*expanded.lock().unwrap(), vec![false]);
        assert_eq!(
            *kinds.lock().unwrap(),
            vec![SidebarEvent::SECTION_CHANGED, SidebarEvent::COLLAPSED]
        );
    }

    #[test]
    fn destroyed_shell_ignores_actions() {
        let mut shell = SidebarShell::default();
        shell.destroy();
        assert!(!shell.collapse());
        assert!(shell.state().is_expanded);
    }
}
