//! Operations for model-based testing and fuzzing.
//!
//! Operations represent the actions a host can take against an engine. Ids
//! are small integers mapped onto a tiny id space so generated sequences
//! hit the same entries repeatedly and exercise updates, duplicates and
//! removals instead of only ever touching fresh ids.

use std::time::Duration;

use arbitrary::Arbitrary;
use tessera_core::{Environment, behaviors::SelectionMode};
use tessera_patterns::{
    ActivationMode, Command, CommandPalette, Direction, GridLayout, HistoryEntry, HubAndSpoke,
    Modal, ModalConfig, Spoke, Tab, TabbedInterface, ToastData, ToastQueue,
};

use crate::SimEnv;

/// Number of distinct ids generated operations pick from.
pub const ID_SPACE: u8 = 8;

/// Map a generated byte onto the shared id space.
pub fn small_id(prefix: &str, raw: u8) -> String {
    format!("{prefix}-{}", raw % ID_SPACE)
}

/// Arrow direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Arrow {
    /// Up.
    Up,
    /// Down.
    Down,
    /// Left.
    Left,
    /// Right.
    Right,
}

impl From<Arrow> for Direction {
    fn from(arrow: Arrow) -> Self {
        match arrow {
            Arrow::Up => Self::Up,
            Arrow::Down => Self::Down,
            Arrow::Left => Self::Left,
            Arrow::Right => Self::Right,
        }
    }
}

/// Grid actions.
#[derive(Debug, Clone, Arbitrary)]
pub enum GridOp {
    /// Arrow navigation.
    Navigate(Arrow),
    /// Focus the first item.
    Home,
    /// Focus the last item.
    End,
    /// Focus an index, possibly out of range.
    SetFocus(u8),
    /// Select the focused item.
    SelectFocused,
    /// Select an item by id.
    Select(u8),
    /// Deselect an item by id.
    Deselect(u8),
    /// Select every item.
    SelectAll,
    /// Clear the selection.
    ClearSelection,
    /// Resize the viewport.
    SetViewportWidth(u16),
    /// Toggle wrapping.
    SetWrap(bool),
    /// Switch between single and multiple selection.
    SetMultiple(bool),
    /// Replace the items with `count` items.
    SetItemCount(u8),
}

/// Items `item-0..count`.
pub fn grid_items(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("item-{i}")).collect()
}

/// Apply `op` to a grid of [`grid_items`].
pub fn apply_grid(grid: &mut GridLayout<String>, op: &GridOp) {
    match *op {
        GridOp::Navigate(arrow) => {
            grid.navigate(arrow.into());
        },
        GridOp::Home => {
            grid.navigate_home();
        },
        GridOp::End => {
            grid.navigate_end();
        },
        GridOp::SetFocus(index) => {
            grid.set_focused_index(usize::from(index));
        },
        GridOp::SelectFocused => {
            grid.select_focused();
        },
        GridOp::Select(raw) => {
            grid.select_item(&format!("item-{}", raw % 32));
        },
        GridOp::Deselect(raw) => {
            grid.deselect_item(&format!("item-{}", raw % 32));
        },
        GridOp::SelectAll => {
            grid.select_all();
        },
        GridOp::ClearSelection => {
            grid.clear_selection();
        },
        GridOp::SetViewportWidth(width) => {
            grid.set_viewport_width(f64::from(width));
        },
        GridOp::SetWrap(wrap) => {
            grid.set_wrap(wrap);
        },
        GridOp::SetMultiple(multiple) => {
            let mode = if multiple { SelectionMode::Multiple } else { SelectionMode::Single };
            grid.set_selection_mode(mode);
        },
        GridOp::SetItemCount(count) => {
            grid.set_items(grid_items(usize::from(count % 32)));
        },
    }
}

/// Modal stack actions.
#[derive(Debug, Clone, Arbitrary)]
pub enum ModalOp {
    /// Open or update a modal.
    Open {
        /// Modal id.
        id: u8,
        /// Stack priority.
        priority: i8,
        /// Whether Escape closes it.
        close_on_escape: bool,
    },
    /// Close a modal.
    Close(u8),
    /// Close the top modal.
    CloseTop,
    /// Close every modal.
    CloseAll,
    /// Press Escape.
    Escape,
    /// Click a modal's backdrop.
    Backdrop(u8),
}

/// Apply `op` to a modal stack.
pub fn apply_modal(modal: &mut Modal<()>, op: &ModalOp) {
    match *op {
        ModalOp::Open { id, priority, close_on_escape } => {
            let config = ModalConfig::new(small_id("modal", id), ())
                .priority(i32::from(priority))
                .close_on_escape(close_on_escape);
            modal.open_modal_with_config(config);
        },
        ModalOp::Close(id) => {
            modal.close_modal(&small_id("modal", id));
        },
        ModalOp::CloseTop => {
            modal.close_top_modal();
        },
        ModalOp::CloseAll => {
            modal.close_all_modals();
        },
        ModalOp::Escape => {
            modal.handle_escape_key();
        },
        ModalOp::Backdrop(id) => {
            modal.handle_backdrop_click(&small_id("modal", id));
        },
    }
}

/// Query fragments generated palette queries are built from.
pub const QUERY_VOCABULARY: &[&str] = &["", "s", "sa", "save", "op", "open", "x", "cmd", "e"];

/// Command palette actions.
#[derive(Debug, Clone, Arbitrary)]
pub enum PaletteOp {
    /// Open and reset.
    Open,
    /// Close.
    Close,
    /// Toggle open state.
    Toggle,
    /// Type a query from [`QUERY_VOCABULARY`].
    Query(u8),
    /// Move the selection down.
    Next,
    /// Move the selection up.
    Previous,
    /// Select a result index, possibly out of range.
    SetIndex(u8),
    /// Register or replace a command.
    Register {
        /// Command id.
        id: u8,
        /// Whether the command is disabled.
        disabled: bool,
    },
    /// Unregister a command.
    Unregister(u8),
}

/// Label for the generated command with raw id `id`.
pub fn palette_label(id: u8) -> String {
    const LABELS: &[&str] = &["Save", "Save As", "Open File", "Close", "Enable Autosave"];
    let label = LABELS[usize::from(id % ID_SPACE) % LABELS.len()];
    format!("{label} {}", id % ID_SPACE)
}

/// Apply `op` to a command palette.
pub fn apply_palette(palette: &mut CommandPalette, op: &PaletteOp) {
    match *op {
        PaletteOp::Open => {
            palette.open();
        },
        PaletteOp::Close => {
            palette.close();
        },
        PaletteOp::Toggle => {
            palette.toggle();
        },
        PaletteOp::Query(raw) => {
            let query = QUERY_VOCABULARY[usize::from(raw) % QUERY_VOCABULARY.len()];
            palette.set_query(query);
        },
        PaletteOp::Next => {
            palette.select_next();
        },
        PaletteOp::Previous => {
            palette.select_previous();
        },
        PaletteOp::SetIndex(index) => {
            palette.set_selected_index(usize::from(index));
        },
        PaletteOp::Register { id, disabled } => {
            let command =
                Command::new(small_id("cmd", id), palette_label(id), || Ok(())).disabled(disabled);
            palette.register_command(command);
        },
        PaletteOp::Unregister(id) => {
            palette.unregister_command(&small_id("cmd", id));
        },
    }
}

/// Tabbed interface actions.
#[derive(Debug, Clone, Arbitrary)]
pub enum TabOp {
    /// Activate a tab by id.
    Activate(u8),
    /// Focus the next tab.
    FocusNext,
    /// Focus the previous tab.
    FocusPrevious,
    /// Focus the first tab.
    FocusFirst,
    /// Focus the last tab.
    FocusLast,
    /// Focus an index, possibly out of range.
    FocusIndex(u8),
    /// Add a tab.
    Add {
        /// Tab id.
        id: u8,
        /// Whether it starts disabled.
        disabled: bool,
    },
    /// Remove a tab.
    Remove(u8),
    /// Enable or disable a tab.
    SetDisabled {
        /// Tab id.
        id: u8,
        /// New disabled flag.
        disabled: bool,
    },
    /// Switch activation mode.
    SetManual(bool),
}

/// Apply `op` to a tabbed interface.
pub fn apply_tabs(tabs: &mut TabbedInterface, op: &TabOp) {
    match *op {
        TabOp::Activate(id) => {
            tabs.activate_tab(&small_id("tab", id));
        },
        TabOp::FocusNext => {
            tabs.focus_next();
        },
        TabOp::FocusPrevious => {
            tabs.focus_previous();
        },
        TabOp::FocusFirst => {
            tabs.focus_first();
        },
        TabOp::FocusLast => {
            tabs.focus_last();
        },
        TabOp::FocusIndex(index) => {
            tabs.focus_tab(usize::from(index));
        },
        TabOp::Add { id, disabled } => {
            let id = small_id("tab", id);
            tabs.add_tab(Tab::new(id.clone(), id).disabled(disabled));
        },
        TabOp::Remove(id) => {
            tabs.remove_tab(&small_id("tab", id));
        },
        TabOp::SetDisabled { id, disabled } => {
            tabs.set_tab_disabled(&small_id("tab", id), disabled);
        },
        TabOp::SetManual(manual) => {
            let mode = if manual { ActivationMode::Manual } else { ActivationMode::Automatic };
            tabs.set_activation_mode(mode);
        },
    }
}

/// Hub-and-spoke actions.
#[derive(Debug, Clone, Arbitrary)]
pub enum HubOp {
    /// Activate a spoke.
    Activate(u8),
    /// Return to the hub.
    ReturnToHub,
    /// Go back one entry.
    GoBack,
    /// Replay a host history pop; `None` is the hub.
    PopState(Option<u8>),
    /// Add a spoke, optionally under a parent.
    Add {
        /// Spoke id.
        id: u8,
        /// Parent spoke id.
        parent: Option<u8>,
    },
    /// Remove a spoke and its subtree.
    Remove(u8),
}

/// Apply `op` to a hub.
pub fn apply_hub(hub: &mut HubAndSpoke, op: &HubOp) {
    match *op {
        HubOp::Activate(id) => {
            hub.activate_spoke(&small_id("spoke", id));
        },
        HubOp::ReturnToHub => {
            hub.return_to_hub();
        },
        HubOp::GoBack => {
            hub.go_back();
        },
        HubOp::PopState(entry) => {
            let entry = entry.map_or(HistoryEntry::Hub, |id| HistoryEntry::Spoke(small_id("spoke", id)));
            hub.pop_state(&entry);
        },
        HubOp::Add { id, parent } => {
            let id = small_id("spoke", id);
            let parent = parent.map(|parent| small_id("spoke", parent));
            hub.add_spoke(Spoke::new(id.clone(), id), parent.as_deref());
        },
        HubOp::Remove(id) => {
            hub.remove_spoke(&small_id("spoke", id));
        },
    }
}

/// Toast queue actions, including the passage of time.
#[derive(Debug, Clone, Arbitrary)]
pub enum ToastOp {
    /// Add a toast lasting `millis` (zero means the queue default).
    Add {
        /// Lifetime in milliseconds.
        millis: u16,
    },
    /// Remove the toast at this position in the queue, if any.
    RemoveAt(u8),
    /// Clear every toast.
    ClearAll,
    /// Advance the virtual clock and fire expired timers.
    Advance {
        /// Milliseconds to advance.
        millis: u16,
    },
}

/// Apply `op` to a toast queue running on `env`.
pub fn apply_toasts(queue: &mut ToastQueue<SimEnv>, env: &SimEnv, op: &ToastOp) {
    match *op {
        ToastOp::Add { millis } => {
            let data = ToastData::new(format!("toast at {:?}", env.now().since_start()));
            let data = if millis == 0 {
                data
            } else {
                data.duration(Duration::from_millis(u64::from(millis)))
            };
            queue.add_toast(data);
        },
        ToastOp::RemoveAt(index) => {
            let toasts = &queue.state().toasts;
            if !toasts.is_empty() {
                let id = toasts[usize::from(index) % toasts.len()].id.clone();
                queue.remove_toast(&id);
            }
        },
        ToastOp::ClearAll => {
            queue.clear_all_toasts();
        },
        ToastOp::Advance { millis } => {
            env.advance(Duration::from_millis(u64::from(millis)));
            queue.handle_tick();
        },
    }
}
