//! Interaction-pattern engines for Tessera
//!
//! Framework-independent state machines for stateful UI widgets. Each engine
//! owns a [`tessera_core::Store`] snapshot, composes primitive behaviors from
//! [`tessera_core::behaviors`], and exposes the same contract: `state()`,
//! `subscribe()`, `&mut self` actions, an optional event channel, and
//! `destroy()`. View layers render the snapshots and forward input.
//!
//! # Engines
//!
//! - [`MasterDetail`]: list selection projected to a detail item
//! - [`TabbedInterface`]: roving focus synced with an active tab
//! - [`SidebarShell`]: collapsible, pinnable, resizable sidebar
//! - [`Modal`]: priority-ordered modal stack
//! - [`ToastQueue`]: notifications with deadline-driven expiry
//! - [`HubAndSpoke`]: hub navigation over a spoke tree with history
//! - [`GridLayout`]: responsive grid with 2-D keyboard navigation
//! - [`CommandPalette`]: fuzzy-searchable command launcher
//! - [`Wizard`]: multi-step flow with validation gates and branching
//! - [`FloatingActionButton`]: scroll-aware floating button

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod command_palette;
mod error;
pub mod fab;
pub mod grid_layout;
pub mod hub_and_spoke;
mod input;
pub mod master_detail;
pub mod modal;
pub mod sidebar_shell;
pub mod tabbed_interface;
pub mod toast_queue;
pub mod wizard;

pub use command_palette::{
    Command, CommandInfo, CommandPalette, CommandPaletteOptions, CommandPaletteState,
    ExecuteOutcome, PaletteEvent, RankedCommand,
};
pub use error::{GridError, WizardError};
pub use fab::{FabEvent, FabOptions, FabState, FloatingActionButton, ScrollDirection};
pub use grid_layout::{
    Breakpoint, Direction, GridEvent, GridLayout, GridLayoutOptions, GridState,
};
pub use hub_and_spoke::{
    HistoryBridge, HistoryEntry, HubAndSpoke, HubAndSpokeOptions, HubEvent, HubState,
    MemoryHistory, Spoke,
};
pub use input::KeyInput;
pub use master_detail::{MasterDetail, MasterDetailEvent, MasterDetailOptions, MasterDetailState};
pub use modal::{Modal, ModalConfig, ModalEntry, ModalEvent, ModalOptions, ModalState};
pub use sidebar_shell::{SidebarEvent, SidebarOptions, SidebarShell, SidebarState};
pub use tabbed_interface::{
    ActivationMode, Tab, TabEvent, TabbedInterface, TabbedInterfaceOptions, TabsState,
};
pub use toast_queue::{
    Toast, ToastData, ToastKind, ToastPosition, ToastQueue, ToastQueueOptions, ToastQueueState,
};
pub use wizard::{Step, Wizard, WizardOptions, WizardState};
