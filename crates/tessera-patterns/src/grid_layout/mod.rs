//! Responsive grid with 2-D keyboard navigation and selection.
//!
//! The grid keeps items in a flat list and derives rows from the column
//! count of the active [`Breakpoint`]. Focus is a single index; arrow
//! navigation moves by one column horizontally and by one row vertically,
//! optionally wrapping to the opposite edge.
//!
//! # Invariants
//!
//! - `focused_index` is `None` iff `items` is empty, otherwise in bounds.
//! - `breakpoint` is the entry with the largest `min_width <= viewport_width`
//!   (the smallest entry when none fits), and `columns` is its column count.
//! - `selected_items` only references ids of current items.

pub mod breakpoint;
pub mod navigation;

use std::fmt;

use serde::Serialize;
use tessera_core::{
    BusEvent, EventBus, Pattern, Store, SubscriptionId,
    behaviors::{ListSelection, SelectionMode, clamp_index},
};

pub use self::{breakpoint::Breakpoint, navigation::Direction};
use crate::{KeyInput, error::GridError};

/// Snapshot of a [`GridLayout`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridState<T> {
    /// Items in reading order.
    pub items: Vec<T>,
    /// Column count of the active breakpoint.
    pub columns: usize,
    /// Selected item ids in selection order.
    pub selected_items: Vec<String>,
    /// Focused position. `None` iff `items` is empty.
    pub focused_index: Option<usize>,
    /// Active breakpoint.
    pub breakpoint: Breakpoint,
    /// Last reported viewport width.
    pub viewport_width: f64,
    /// Selection mode.
    pub selection_mode: SelectionMode,
    /// Whether navigation wraps at the edges.
    pub wrap: bool,
}

/// Discrete grid occurrences.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// Focus moved.
    ItemFocused {
        /// New focused index.
        index: usize,
        /// Id of the focused item.
        id: String,
    },
    /// The selection changed.
    ItemSelected {
        /// Every selected id after the change.
        selected_ids: Vec<String>,
    },
    /// The resolved breakpoint changed.
    BreakpointChanged {
        /// Newly active breakpoint.
        breakpoint: Breakpoint,
    },
}

impl GridEvent {
    /// Kind of [`GridEvent::ItemFocused`].
    pub const ITEM_FOCUSED: &'static str = "item:focused";
    /// Kind of [`GridEvent::ItemSelected`].
    pub const ITEM_SELECTED: &'static str = "item:selected";
    /// Kind of [`GridEvent::BreakpointChanged`].
    pub const BREAKPOINT_CHANGED: &'static str = "breakpoint:changed";
}

impl BusEvent for GridEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::ItemFocused { .. } => Self::ITEM_FOCUSED,
            Self::ItemSelected { .. } => Self::ITEM_SELECTED,
            Self::BreakpointChanged { .. } => Self::BREAKPOINT_CHANGED,
        }
    }
}

type IdFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// Construction options for [`GridLayout`].
pub struct GridLayoutOptions<T> {
    /// Initial items.
    pub items: Vec<T>,
    /// Breakpoint table. Must be non-empty and valid.
    pub breakpoints: Vec<Breakpoint>,
    /// Selection mode.
    pub selection_mode: SelectionMode,
    /// Whether navigation wraps at the edges.
    pub wrap: bool,
    /// Viewport width used to resolve the initial breakpoint.
    pub initial_viewport_width: f64,
    /// Initially focused index, clamped into bounds.
    pub initial_focused_index: usize,
    get_id: IdFn<T>,
    on_selection_change: Option<Box<dyn FnMut(&[T]) + Send>>,
    on_focus_change: Option<Box<dyn FnMut(usize, &T) + Send>>,
    on_breakpoint_change: Option<Box<dyn FnMut(&Breakpoint) + Send>>,
}

impl<T> fmt::Debug for GridLayoutOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridLayoutOptions")
            .field("items", &self.items.len())
            .field("breakpoints", &self.breakpoints)
            .field("selection_mode", &self.selection_mode)
            .field("wrap", &self.wrap)
            .field("initial_viewport_width", &self.initial_viewport_width)
            .field("initial_focused_index", &self.initial_focused_index)
            .finish_non_exhaustive()
    }
}

impl<T> GridLayoutOptions<T> {
    /// Options with defaults: single selection, no wrap, viewport width 0,
    /// focus on the first item.
    pub fn new(
        items: Vec<T>,
        get_id: impl Fn(&T) -> String + Send + Sync + 'static,
        breakpoints: Vec<Breakpoint>,
    ) -> Self {
        Self {
            items,
            breakpoints,
            selection_mode: SelectionMode::Single,
            wrap: false,
            initial_viewport_width: 0.0,
            initial_focused_index: 0,
            get_id: Box::new(get_id),
            on_selection_change: None,
            on_focus_change: None,
            on_breakpoint_change: None,
        }
    }

    /// Set the selection mode.
    #[must_use]
    pub fn selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Enable or disable wrap-around navigation.
    #[must_use]
    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// Set the initial viewport width.
    #[must_use]
    pub fn initial_viewport_width(mut self, width: f64) -> Self {
        self.initial_viewport_width = width;
        self
    }

    /// Set the initially focused index.
    #[must_use]
    pub fn initial_focused_index(mut self, index: usize) -> Self {
        self.initial_focused_index = index;
        self
    }

    /// Called with the selected items after every selection change.
    #[must_use]
    pub fn with_on_selection_change(mut self, f: impl FnMut(&[T]) + Send + 'static) -> Self {
        self.on_selection_change = Some(Box::new(f));
        self
    }

    /// Called with the index and item after every focus move.
    #[must_use]
    pub fn with_on_focus_change(mut self, f: impl FnMut(usize, &T) + Send + 'static) -> Self {
        self.on_focus_change = Some(Box::new(f));
        self
    }

    /// Called after the resolved breakpoint changes.
    #[must_use]
    pub fn with_on_breakpoint_change(
        mut self,
        f: impl FnMut(&Breakpoint) + Send + 'static,
    ) -> Self {
        self.on_breakpoint_change = Some(Box::new(f));
        self
    }
}

/// Responsive grid engine.
pub struct GridLayout<T> {
    store: Store<GridState<T>>,
    events: EventBus<GridEvent>,
    selection: ListSelection,
    breakpoints: Vec<Breakpoint>,
    get_id: IdFn<T>,
    on_selection_change: Option<Box<dyn FnMut(&[T]) + Send>>,
    on_focus_change: Option<Box<dyn FnMut(usize, &T) + Send>>,
    on_breakpoint_change: Option<Box<dyn FnMut(&Breakpoint) + Send>>,
}

impl<T: fmt::Debug> fmt::Debug for GridLayout<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridLayout")
            .field("store", &self.store)
            .field("breakpoints", &self.breakpoints)
            .finish_non_exhaustive()
    }
}

impl<T> GridLayout<T>
where
    T: Clone + PartialEq,
{
    /// Create a grid from `options`.
    ///
    /// # Errors
    ///
    /// Returns a [`GridError`] if the breakpoint table is empty or contains
    /// an entry with a negative width or zero columns.
    pub fn new(options: GridLayoutOptions<T>) -> Result<Self, GridError> {
        let GridLayoutOptions {
            items,
            breakpoints,
            selection_mode,
            wrap,
            initial_viewport_width,
            initial_focused_index,
            get_id,
            on_selection_change,
            on_focus_change,
            on_breakpoint_change,
        } = options;

        let breakpoints = breakpoint::normalize(breakpoints)?;
        let viewport_width = sanitize_width(initial_viewport_width);
        let active = breakpoint::resolve(&breakpoints, viewport_width)
            .cloned()
            .ok_or(GridError::EmptyBreakpoints)?;

        let ids = items.iter().map(|item| get_id(item)).collect();
        let selection = ListSelection::new(ids, selection_mode);
        let state = GridState {
            focused_index: clamp_index(initial_focused_index, items.len()),
            items,
            columns: active.columns,
            selected_items: Vec::new(),
            breakpoint: active,
            viewport_width,
            selection_mode,
            wrap,
        };

        Ok(Self {
            store: Store::new(state),
            events: EventBus::new(),
            selection,
            breakpoints,
            get_id,
            on_selection_change,
            on_focus_change,
            on_breakpoint_change,
        })
    }

    /// Current snapshot.
    pub fn state(&self) -> &GridState<T> {
        self.store.state()
    }

    /// Register a state listener.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&GridState<T>) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a state listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Event channel for `item:focused`, `item:selected` and
    /// `breakpoint:changed`.
    pub fn events_mut(&mut self) -> &mut EventBus<GridEvent> {
        &mut self.events
    }

    /// Normalized breakpoint table.
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Focused item.
    pub fn focused_item(&self) -> Option<&T> {
        let state = self.store.state();
        state.focused_index.and_then(|i| state.items.get(i))
    }

    /// Selected items in selection order.
    pub fn selected(&self) -> Vec<T> {
        self.materialize(&self.store.state().selected_items)
    }

    /// Row of the focused item.
    pub fn current_row(&self) -> Option<usize> {
        let state = self.store.state();
        state.focused_index.map(|i| navigation::row_of(i, state.columns))
    }

    /// Column of the focused item.
    pub fn current_column(&self) -> Option<usize> {
        let state = self.store.state();
        state.focused_index.map(|i| navigation::column_of(i, state.columns))
    }

    /// Move focus one row up.
    pub fn navigate_up(&mut self) -> bool {
        self.navigate(Direction::Up)
    }

    /// Move focus one row down.
    pub fn navigate_down(&mut self) -> bool {
        self.navigate(Direction::Down)
    }

    /// Move focus one item back.
    pub fn navigate_left(&mut self) -> bool {
        self.navigate(Direction::Left)
    }

    /// Move focus one item forward.
    pub fn navigate_right(&mut self) -> bool {
        self.navigate(Direction::Right)
    }

    /// Move focus in `direction`. Returns `true` if focus moved.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        let state = self.store.state();
        let Some(current) = state.focused_index else {
            tracing::warn!(?direction, "cannot navigate an empty grid");
            return false;
        };
        match navigation::step(direction, current, state.items.len(), state.columns, state.wrap) {
            Some(target) => self.focus(target),
            None => false,
        }
    }

    /// Focus the first item.
    pub fn navigate_home(&mut self) -> bool {
        if self.store.state().items.is_empty() {
            tracing::warn!("cannot navigate an empty grid");
            return false;
        }
        self.focus(0)
    }

    /// Focus the last item.
    pub fn navigate_end(&mut self) -> bool {
        let len = self.store.state().items.len();
        if len == 0 {
            tracing::warn!("cannot navigate an empty grid");
            return false;
        }
        self.focus(len - 1)
    }

    /// Focus `index`. Out-of-range indices are ignored with a warning.
    pub fn set_focused_index(&mut self, index: usize) -> bool {
        let len = self.store.state().items.len();
        if index >= len {
            tracing::warn!(index, len, "focused index out of range");
            return false;
        }
        self.focus(index)
    }

    /// Translate a key press into navigation or selection.
    ///
    /// Arrows navigate, Home/End jump, Enter and Space select the focused
    /// item. Returns `true` if the key changed state.
    pub fn handle_key(&mut self, key: KeyInput) -> bool {
        match key {
            KeyInput::Up => self.navigate_up(),
            KeyInput::Down => self.navigate_down(),
            KeyInput::Left => self.navigate_left(),
            KeyInput::Right => self.navigate_right(),
            KeyInput::Home => self.navigate_home(),
            KeyInput::End => self.navigate_end(),
            KeyInput::Enter | KeyInput::Char(' ') => self.select_focused(),
            _ => false,
        }
    }

    /// Select the item with `id`.
    ///
    /// Single mode replaces the selection, multiple mode appends.
    pub fn select_item(&mut self, id: &str) -> bool {
        let changed = self.selection.select(id);
        if changed {
            self.sync_selection();
        }
        changed
    }

    /// Select the focused item.
    pub fn select_focused(&mut self) -> bool {
        let Some(item) = self.focused_item() else {
            tracing::warn!("no focused item to select");
            return false;
        };
        let id = (self.get_id)(item);
        self.select_item(&id)
    }

    /// Remove `id` from the selection.
    pub fn deselect_item(&mut self, id: &str) -> bool {
        let changed = self.selection.deselect(id);
        if changed {
            self.sync_selection();
        }
        changed
    }

    /// Select every item. Requires multiple selection mode.
    pub fn select_all(&mut self) -> bool {
        let changed = self.selection.select_all();
        if changed {
            self.sync_selection();
        }
        changed
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) -> bool {
        let changed = self.selection.clear_selection();
        if changed {
            self.sync_selection();
        }
        changed
    }

    /// Replace the items.
    ///
    /// Clears the selection and re-clamps focus into the new bounds in the
    /// same update.
    pub fn set_items(&mut self, items: Vec<T>) -> bool {
        let had_selection = !self.selection.selected().is_empty();
        let ids = items.iter().map(|item| (self.get_id)(item)).collect();
        self.selection.set_items(ids);

        let changed = self.store.update(|s| {
            let current = s.focused_index.unwrap_or(0);
            s.focused_index = clamp_index(current, items.len());
            s.items = items;
            s.selected_items.clear();
        });
        if changed && had_selection {
            self.notify_selection();
        }
        changed
    }

    /// Report a new viewport width and re-resolve the breakpoint.
    ///
    /// `breakpoint:changed` fires only if the resolved breakpoint differs.
    pub fn set_viewport_width(&mut self, width: f64) -> bool {
        if !width.is_finite() || width < 0.0 {
            tracing::warn!(width, "ignoring invalid viewport width");
            return false;
        }
        self.apply_breakpoints(width)
    }

    /// Replace the breakpoint table at runtime.
    ///
    /// An invalid table is logged and ignored.
    pub fn set_breakpoints(&mut self, breakpoints: Vec<Breakpoint>) -> bool {
        match breakpoint::normalize(breakpoints) {
            Ok(normalized) => {
                self.breakpoints = normalized;
                let width = self.store.state().viewport_width;
                self.apply_breakpoints(width)
            },
            Err(error) => {
                tracing::warn!(%error, "ignoring invalid breakpoint table");
                false
            },
        }
    }

    /// Enable or disable wrap-around navigation.
    pub fn set_wrap(&mut self, wrap: bool) -> bool {
        self.store.update(|s| s.wrap = wrap)
    }

    /// Switch selection mode. Going to single keeps the first selected id.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) -> bool {
        let selection_changed = self.selection.set_mode(mode);
        let changed = self.store.update(|s| s.selection_mode = mode);
        if selection_changed {
            self.sync_selection();
        }
        changed || selection_changed
    }

    /// Release listeners, handlers and the composed selection. Idempotent.
    pub fn destroy(&mut self) {
        self.store.destroy();
        self.events.close();
        self.selection.destroy();
        self.on_selection_change = None;
        self.on_focus_change = None;
        self.on_breakpoint_change = None;
    }

    /// Whether [`GridLayout::destroy`] has been called.
    pub fn is_destroyed(&self) -> bool {
        self.store.is_destroyed()
    }

    fn focus(&mut self, index: usize) -> bool {
        if !self.store.update(|s| s.focused_index = Some(index)) {
            return false;
        }
        let Some(item) = self.store.state().items.get(index) else { return true };
        let id = (self.get_id)(item);
        if let Some(on_focus_change) = self.on_focus_change.as_mut() {
            on_focus_change(index, item);
        }
        self.events.emit(&GridEvent::ItemFocused { index, id });
        true
    }

    fn apply_breakpoints(&mut self, width: f64) -> bool {
        let Some(active) = breakpoint::resolve(&self.breakpoints, width).cloned() else {
            return false;
        };
        let breakpoint_changed = active != self.store.state().breakpoint;
        let changed = self.store.update(|s| {
            s.viewport_width = width;
            s.columns = active.columns;
            s.breakpoint = active.clone();
        });
        if changed && breakpoint_changed {
            tracing::debug!(columns = active.columns, min_width = active.min_width, "breakpoint changed");
            if let Some(on_breakpoint_change) = self.on_breakpoint_change.as_mut() {
                on_breakpoint_change(&active);
            }
            self.events.emit(&GridEvent::BreakpointChanged { breakpoint: active });
        }
        changed
    }

    /// Mirror the composed selection into grid state, then notify.
    fn sync_selection(&mut self) {
        let selected = self.selection.selected().to_vec();
        self.store.update(|s| s.selected_items = selected);
        self.notify_selection();
    }

    fn notify_selection(&mut self) {
        let selected_ids = self.store.state().selected_items.clone();
        if let Some(on_selection_change) = self.on_selection_change.as_mut() {
            let items = materialize(&self.store.state().items, &self.get_id, &selected_ids);
            on_selection_change(&items);
        }
        self.events.emit(&GridEvent::ItemSelected { selected_ids });
    }

    fn materialize(&self, ids: &[String]) -> Vec<T> {
        materialize(&self.store.state().items, &self.get_id, ids)
    }
}

/// Map ids back to items, preserving id order and skipping unknown ids.
fn materialize<T: Clone>(items: &[T], get_id: &IdFn<T>, ids: &[String]) -> Vec<T> {
    ids.iter().filter_map(|id| items.iter().find(|item| get_id(item) == *id).cloned()).collect()
}

fn sanitize_width(width: f64) -> f64 {
    if width.is_finite() && width >= 0.0 {
        width
    } else {
        tracing::warn!(width, "invalid initial viewport width, using 0");
        0.0
    }
}

impl<T> Pattern for GridLayout<T>
where
    T: Clone + PartialEq + 'static,
{
    type State = GridState<T>;

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
    struct Card {
        id: String,
    }

    fn cards(count: usize) -> Vec<Card> {
        (1..=count).map(|i| Card { id: format!("i{i}") }).collect()
    }

    fn grid(count: usize, columns: usize) -> GridLayout<Card> {
        let options = GridLayoutOptions::new(
            cards(count),
            |card: &Card| card.id.clone(),
            vec![Breakpoint::new(0.0, columns)],
        );
        GridLayout::new(options).unwrap()
    }

    fn responsive_grid() -> GridLayout<Card> {
        let options = GridLayoutOptions::new(
            cards(12),
            |card: &Card| card.id.clone(),
            vec![
                Breakpoint::named("sm", 0.0, 1),
                Breakpoint::named("md", 640.0, 2),
                Breakpoint::named("lg", 1024.0, 4),
            ],
        )
        .initial_viewport_width(800.0);
        GridLayout::new(options).unwrap()
    }

    #[test]
    fn right_from_last_wraps_to_first() {
        let options = GridLayoutOptions::new(
            cards(6),
            |card: &Card| card.id.clone(),
            vec![Breakpoint::new(0.0, 3)],
        )
        .wrap(true)
        .initial_focused_index(5);
        let mut grid = GridLayout::new(options).unwrap();

        assert!(grid.navigate_right());
        assert_eq!(grid.state().focused_index, Some(0));
    }

    #[test]
    fn construction_rejects_bad_breakpoints() {
        let empty = GridLayoutOptions::new(cards(2), |c: &Card| c.id.clone(), Vec::new());
        assert_eq!(GridLayout::new(empty).err(), Some(GridError::EmptyBreakpoints));

        let zero = GridLayoutOptions::new(
            cards(2),
            |c: &Card| c.id.clone(),
            vec![Breakpoint::new(0.0, 0)],
        );
        assert!(matches!(GridLayout::new(zero), Err(GridError::ZeroColumns { .. })));
    }

    #[test]
    fn initial_focus_is_clamped() {
        let options =
            GridLayoutOptions::new(cards(3), |c: &Card| c.id.clone(), vec![Breakpoint::new(0.0, 2)])
                .initial_focused_index(99);
        let grid = GridLayout::new(options).unwrap();
        assert_eq!(grid.state().focused_index, Some(2));
    }

    #[test]
    fn empty_grid_has_no_focus_and_ignores_navigation() {
        let mut grid = grid(0, 3);
        assert_eq!(grid.state().focused_index, None);
        assert!(!grid.navigate_down());
        assert!(!grid.navigate_home());
    }

    #[test]
    fn vertical_navigation_moves_by_columns() {
        let mut grid = grid(9, 3);
        assert!(grid.navigate_down());
        assert_eq!(grid.state().focused_index, Some(3));
        assert!(grid.navigate_up());
        assert_eq!(grid.state().focused_index, Some(0));
        assert!(!grid.navigate_up());
    }

    #[test]
    fn breakpoint_resolution_follows_viewport() {
        let mut grid = responsive_grid();
        assert_eq!(grid.state().columns, 2);
        assert_eq!(grid.state().breakpoint.name.as_deref(), Some("md"));

        grid.set_viewport_width(1200.0);
        assert_eq!(grid.state().columns, 4);

        grid.set_viewport_width(10.0);
        assert_eq!(grid.state().columns, 1);
    }

    #[test]
    fn breakpoint_event_fires_only_on_change() {
        let mut grid = responsive_grid();
        let fired = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&fired);
        grid.events_mut().on(GridEvent::BREAKPOINT_CHANGED, move |_| {
            *counter.lock().unwrap() += 1;
        });

        grid.set_viewport_width(900.0);
        grid.set_viewport_width(700.0);
        assert_eq!(*fired.lock().unwrap(), 0);

        grid.set_viewport_width(1100.0);
        assert_eq!(*fired.lock().unwrap(), 1);
    }

    #[test]
    fn runtime_invalid_breakpoints_are_ignored() {
        let mut grid = responsive_grid();
        assert!(!grid.set_breakpoints(Vec::new()));
        assert!(!grid.set_viewport_width(-5.0));
        assert_eq!(grid.breakpoints().len(), 3);
        assert_eq!(grid.state().columns, 2);
    }

    #[test]
    fn multi_select_appends_and_reports_items() {
        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reported);
        let options =
            GridLayoutOptions::new(cards(4), |c: &Card| c.id.clone(), vec![Breakpoint::new(0.0, 2)])
                .selection_mode(SelectionMode::Multiple)
                .with_on_selection_change(move |items: &[Card]| {
                    *sink.lock().unwrap() = items.iter().map(|c| c.id.clone()).collect::<Vec<_>>();
                });
        let mut grid = GridLayout::new(options).unwrap();

        grid.select_item("i3");
        grid.select_item("i1");

        assert_eq!(grid.state().selected_items, vec!["i3".to_string(), "i1".to_string()]);
        assert_eq!(*reported.lock().unwrap(), vec!["i3".to_string(), "i1".to_string()]);
    }

    #[test]
    fn single_select_replaces() {
        let mut grid = grid(4, 2);
        grid.select_item("i1");
        grid.select_item("i2");
        assert_eq!(grid.state().selected_items, vec!["i2".to_string()]);
        assert_eq!(grid.selected(), vec![Card { id: "i2".into() }]);
    }

    #[test]
    fn set_items_clears_selection_and_reclamps_focus() {
        let mut grid = grid(6, 3);
        grid.set_focused_index(5);
        grid.select_item("i2");

        grid.set_items(cards(2));

        assert_eq!(grid.state().focused_index, Some(1));
        assert!(grid.state().selected_items.is_empty());
        assert!(grid.selected().is_empty());
    }

    #[test]
    fn focus_events_carry_item_id() {
        let mut grid = grid(4, 2);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        grid.events_mut().on(GridEvent::ITEM_FOCUSED, move |event| {
            if let GridEvent::ItemFocused { id, .. } = event {
                sink.lock().unwrap().push(id.clone());
            }
        });

        grid.handle_key(KeyInput::Right);
        grid.handle_key(KeyInput::Down);

        assert_eq!(*seen.lock().unwrap(), vec!["i2".to_string(), "i4".to_string()]);
    }

    #[test]
    fn enter_selects_focused_item() {
        let mut grid = grid(4, 2);
        grid.handle_key(KeyInput::End);
        grid.handle_key(KeyInput::Enter);
        assert_eq!(grid.state().selected_items, vec!["i4".to_string()]);
    }

    #[test]
    fn destroy_silences_listeners() {
        let mut grid = grid(4, 2);
        let notified = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&notified);
        grid.subscribe(move |_| *counter.lock().unwrap() += 1);

        grid.destroy();
        grid.destroy();

        assert!(!grid.navigate_right());
        assert!(!grid.select_item("i1"));
        assert_eq!(*notified.lock().unwrap(), 0);
    }
}
