//! Searchable command palette.
//!
//! Commands are registered with a label, optional category and keywords, and
//! an action. Typing a query filters the registry with fuzzy subsequence
//! matching. The selection cursor is a [`RovingFocus`] over the filtered
//! results, so it always points into the filtered list and wraps at the ends.
//!
//! Executing a command never fails from the caller's point of view: a failing
//! action is logged, and the palette closes afterwards in every case.

pub mod fuzzy;

use std::{collections::HashMap, fmt, future::Future};

use futures::{FutureExt, future::BoxFuture};
use serde::Serialize;
use tessera_core::{
    BusEvent, CallbackResult, EventBus, Pattern, Store, SubscriptionId, behaviors::RovingFocus,
};

use crate::KeyInput;

/// Async command action.
pub type CommandAction = Box<dyn FnMut() -> BoxFuture<'static, CallbackResult> + Send>;

/// Data describing a command, without its action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandInfo {
    /// Unique command id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Optional grouping shown next to the label.
    pub category: Option<String>,
    /// Extra search terms.
    pub keywords: Vec<String>,
    /// Display-only keyboard shortcut hint.
    pub shortcut: Option<String>,
    /// Disabled commands are hidden from results and cannot execute.
    pub disabled: bool,
}

impl CommandInfo {
    /// Label, category and keywords joined for matching.
    pub fn searchable_text(&self) -> String {
        let mut text = self.label.clone();
        if let Some(category) = &self.category {
            text.push(' ');
            text.push_str(category);
        }
        for keyword in &self.keywords {
            text.push(' ');
            text.push_str(keyword);
        }
        text
    }
}

/// A command together with its action.
pub struct Command {
    info: CommandInfo,
    action: CommandAction,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("info", &self.info).finish_non_exhaustive()
    }
}

impl Command {
    /// Command with a synchronous action.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        mut action: impl FnMut() -> CallbackResult + Send + 'static,
    ) -> Self {
        Self::with_action(
            id,
            label,
            Box::new(move || {
                let result = action();
                async move { result }.boxed()
            }),
        )
    }

    /// Command with an asynchronous action.
    pub fn new_async<F, Fut>(id: impl Into<String>, label: impl Into<String>, mut action: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        Self::with_action(id, label, Box::new(move || action().boxed()))
    }

    fn with_action(id: impl Into<String>, label: impl Into<String>, action: CommandAction) -> Self {
        let info = CommandInfo {
            id: id.into(),
            label: label.into(),
            category: None,
            keywords: Vec::new(),
            shortcut: None,
            disabled: false,
        };
        Self { info, action }
    }

    /// Set the category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.info.category = Some(category.into());
        self
    }

    /// Set search keywords.
    #[must_use]
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.info.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the shortcut hint.
    #[must_use]
    pub fn shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.info.shortcut = Some(shortcut.into());
        self
    }

    /// Mark the command disabled.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.info.disabled = disabled;
        self
    }

    /// Command data.
    pub fn info(&self) -> &CommandInfo {
        &self.info
    }
}

/// A command that matched the current query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCommand {
    /// The matched command.
    #[serde(flatten)]
    pub command: CommandInfo,
    /// Char indices of matched characters within the label, for highlighting.
    pub highlights: Vec<usize>,
}

/// Snapshot of a [`CommandPalette`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandPaletteState {
    /// Whether the palette is showing.
    pub is_open: bool,
    /// Current query text.
    pub query: String,
    /// Every registered command in registration order.
    pub commands: Vec<CommandInfo>,
    /// Enabled commands matching `query`, best match first.
    pub filtered_commands: Vec<RankedCommand>,
    /// Cursor into `filtered_commands`. Zero when the list is empty.
    pub selected_index: usize,
}

impl CommandPaletteState {
    /// Command under the cursor.
    pub fn selected_command(&self) -> Option<&CommandInfo> {
        self.filtered_commands.get(self.selected_index).map(|ranked| &ranked.command)
    }
}

/// Discrete palette occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteEvent {
    /// The palette opened.
    Opened,
    /// The palette closed.
    Closed,
    /// The query changed.
    QueryChanged {
        /// New query.
        query: String,
    },
    /// A command executed.
    CommandExecuted {
        /// Executed command id.
        id: String,
        /// Whether the action reported success.
        succeeded: bool,
    },
    /// A command was registered or replaced.
    CommandRegistered {
        /// Registered command id.
        id: String,
    },
    /// A command was removed.
    CommandUnregistered {
        /// Removed command id.
        id: String,
    },
}

impl PaletteEvent {
    /// Kind of [`PaletteEvent::Opened`].
    pub const OPENED: &'static str = "palette:opened";
    /// Kind of [`PaletteEvent::Closed`].
    pub const CLOSED: &'static str = "palette:closed";
    /// Kind of [`PaletteEvent::QueryChanged`].
    pub const QUERY_CHANGED: &'static str = "query:changed";
    /// Kind of [`PaletteEvent::CommandExecuted`].
    pub const COMMAND_EXECUTED: &'static str = "command:executed";
    /// Kind of [`PaletteEvent::CommandRegistered`].
    pub const COMMAND_REGISTERED: &'static str = "command:registered";
    /// Kind of [`PaletteEvent::CommandUnregistered`].
    pub const COMMAND_UNREGISTERED: &'static str = "command:unregistered";
}

impl BusEvent for PaletteEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::Opened => Self::OPENED,
            Self::Closed => Self::CLOSED,
            Self::QueryChanged { .. } => Self::QUERY_CHANGED,
            Self::CommandExecuted { .. } => Self::COMMAND_EXECUTED,
            Self::CommandRegistered { .. } => Self::COMMAND_REGISTERED,
            Self::CommandUnregistered { .. } => Self::COMMAND_UNREGISTERED,
        }
    }
}

/// Outcome of [`CommandPalette::execute_command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// The action ran and succeeded.
    Executed,
    /// The action ran and reported an error, which was logged.
    Failed,
    /// The command is disabled and did not run.
    Disabled,
    /// No command has this id.
    NotFound,
}

/// Construction options for [`CommandPalette`].
#[derive(Default)]
pub struct CommandPaletteOptions {
    /// Initially registered commands.
    pub commands: Vec<Command>,
    on_open: Option<Box<dyn FnMut() + Send>>,
    on_close: Option<Box<dyn FnMut() + Send>>,
    on_command_execute: Option<Box<dyn FnMut(&CommandInfo) + Send>>,
}

impl fmt::Debug for CommandPaletteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandPaletteOptions")
            .field("commands", &self.commands)
            .finish_non_exhaustive()
    }
}

impl CommandPaletteOptions {
    /// Options registering `commands`.
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands, ..Self::default() }
    }

    /// Called when the palette opens.
    #[must_use]
    pub fn with_on_open(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_open = Some(Box::new(f));
        self
    }

    /// Called when the palette closes.
    #[must_use]
    pub fn with_on_close(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }

    /// Called after a command's action has run.
    #[must_use]
    pub fn with_on_command_execute(mut self, f: impl FnMut(&CommandInfo) + Send + 'static) -> Self {
        self.on_command_execute = Some(Box::new(f));
        self
    }
}

/// Command palette engine.
pub struct CommandPalette {
    store: Store<CommandPaletteState>,
    events: EventBus<PaletteEvent>,
    actions: HashMap<String, CommandAction>,
    focus: RovingFocus,
    on_open: Option<Box<dyn FnMut() + Send>>,
    on_close: Option<Box<dyn FnMut() + Send>>,
    on_command_execute: Option<Box<dyn FnMut(&CommandInfo) + Send>>,
}

impl fmt::Debug for CommandPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandPalette").field("store", &self.store).finish_non_exhaustive()
    }
}

impl Default for CommandPalette {
    fn default() -> Self {
        Self::new(CommandPaletteOptions::default())
    }
}

impl CommandPalette {
    /// Create a closed palette.
    pub fn new(options: CommandPaletteOptions) -> Self {
        let CommandPaletteOptions { commands, on_open, on_close, on_command_execute } = options;

        let mut infos: Vec<CommandInfo> = Vec::with_capacity(commands.len());
        let mut actions = HashMap::with_capacity(commands.len());
        for Command { info, action } in commands {
            upsert(&mut infos, info.clone());
            actions.insert(info.id, action);
        }

        let filtered_commands = filter_commands(&infos, "");
        let focus = RovingFocus::new(result_ids(&filtered_commands), 0, true);
        let state = CommandPaletteState {
            is_open: false,
            query: String::new(),
            commands: infos,
            filtered_commands,
            selected_index: 0,
        };
        Self {
            store: Store::new(state),
            events: EventBus::new(),
            actions,
            focus,
            on_open,
            on_close,
            on_command_execute,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> &CommandPaletteState {
        self.store.state()
    }

    /// Register a state listener.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&CommandPaletteState) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a state listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Event channel.
    pub fn events_mut(&mut self) -> &mut EventBus<PaletteEvent> {
        &mut self.events
    }

    /// Open the palette with an empty query and the cursor on the first
    /// result. Opening an open palette resets it.
    pub fn open(&mut self) -> bool {
        let was_open = self.store.state().is_open;
        let filtered = filter_commands(&self.store.state().commands, "");
        let selected = self.refocus_first(&filtered);
        let changed = self.store.update(|s| {
            s.is_open = true;
            s.query.clear();
            s.filtered_commands = filtered;
            s.selected_index = selected;
        });
        if !was_open && changed {
            if let Some(on_open) = self.on_open.as_mut() {
                on_open();
            }
            self.events.emit(&PaletteEvent::Opened);
        }
        changed
    }

    /// Close the palette.
    pub fn close(&mut self) -> bool {
        self.focus.move_first();
        let changed = self.store.update(|s| {
            s.is_open = false;
            s.selected_index = 0;
        });
        if changed {
            if let Some(on_close) = self.on_close.as_mut() {
                on_close();
            }
            self.events.emit(&PaletteEvent::Closed);
        }
        changed
    }

    /// Open if closed, close if open.
    pub fn toggle(&mut self) -> bool {
        if self.store.state().is_open { self.close() } else { self.open() }
    }

    /// Replace the query, re-filter and reset the cursor.
    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        let filtered = filter_commands(&self.store.state().commands, &query);
        let selected = self.refocus_first(&filtered);
        let changed = self.store.update(|s| {
            s.filtered_commands = filtered;
            s.query = query.clone();
            s.selected_index = selected;
        });
        if changed {
            self.events.emit(&PaletteEvent::QueryChanged { query });
        }
        changed
    }

    /// Move the cursor down, wrapping to the top.
    pub fn select_next(&mut self) -> bool {
        self.focus.move_next() && self.sync_selection()
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn select_previous(&mut self) -> bool {
        self.focus.move_previous() && self.sync_selection()
    }

    /// Put the cursor on `index` of the filtered list.
    pub fn set_selected_index(&mut self, index: usize) -> bool {
        self.focus.move_to(index) && self.sync_selection()
    }

    /// Register `command`, replacing any command with the same id in place.
    pub fn register_command(&mut self, command: Command) -> bool {
        let Command { info, action } = command;
        let id = info.id.clone();
        self.actions.insert(id.clone(), action);
        let mut commands = self.store.state().commands.clone();
        upsert(&mut commands, info);
        let changed = self.replace_registry(commands);
        if changed {
            self.events.emit(&PaletteEvent::CommandRegistered { id });
        }
        changed
    }

    /// Remove the command with `id`.
    pub fn unregister_command(&mut self, id: &str) -> bool {
        if self.actions.remove(id).is_none() {
            tracing::warn!(id, "cannot unregister unknown command");
            return false;
        }
        let mut commands = self.store.state().commands.clone();
        commands.retain(|command| command.id != id);
        let changed = self.replace_registry(commands);
        if changed {
            self.events.emit(&PaletteEvent::CommandUnregistered { id: id.to_string() });
        }
        changed
    }

    /// Execute the command with `id` from the full registry, then close.
    ///
    /// A failing action is logged and swallowed. The palette closes whether
    /// or not the command exists.
    pub async fn execute_command(&mut self, id: &str) -> ExecuteOutcome {
        let info = self.store.state().commands.iter().find(|command| command.id == id).cloned();
        let outcome = match (info, self.actions.get_mut(id)) {
            (Some(info), Some(action)) if !info.disabled => {
                let outcome = match action().await {
                    Ok(()) => ExecuteOutcome::Executed,
                    Err(error) => {
                        tracing::error!(id, %error, "command action failed");
                        ExecuteOutcome::Failed
                    },
                };
                if let Some(on_command_execute) = self.on_command_execute.as_mut() {
                    on_command_execute(&info);
                }
                self.events.emit(&PaletteEvent::CommandExecuted {
                    id: info.id,
                    succeeded: outcome == ExecuteOutcome::Executed,
                });
                outcome
            },
            (Some(_), _) => {
                tracing::warn!(id, "refusing to execute disabled command");
                ExecuteOutcome::Disabled
            },
            (None, _) => {
                tracing::warn!(id, "cannot execute unknown command");
                ExecuteOutcome::NotFound
            },
        };
        self.close();
        outcome
    }

    /// Execute the command under the cursor.
    pub async fn execute_selected(&mut self) -> ExecuteOutcome {
        let Some(id) = self.store.state().selected_command().map(|command| command.id.clone())
        else {
            tracing::warn!("no command selected");
            self.close();
            return ExecuteOutcome::NotFound;
        };
        self.execute_command(&id).await
    }

    /// Translate a key press while the palette is open.
    ///
    /// Up/Down move the cursor, Enter executes the selection, Esc closes,
    /// printable characters and Backspace edit the query.
    pub async fn handle_key(&mut self, key: KeyInput) -> bool {
        if !self.store.state().is_open {
            return false;
        }
        match key {
            KeyInput::Up => self.select_previous(),
            KeyInput::Down | KeyInput::Tab => self.select_next(),
            KeyInput::Enter => self.execute_selected().await != ExecuteOutcome::NotFound,
            KeyInput::Esc => self.close(),
            KeyInput::Backspace => {
                let mut query = self.store.state().query.clone();
                query.pop().is_some() && self.set_query(query)
            },
            KeyInput::Char(c) => {
                let mut query = self.store.state().query.clone();
                query.push(c);
                self.set_query(query)
            },
            KeyInput::Left | KeyInput::Right | KeyInput::Home | KeyInput::End => false,
        }
    }

    /// Release listeners, handlers and actions. Idempotent.
    pub fn destroy(&mut self) {
        self.store.destroy();
        self.events.close();
        self.actions.clear();
        self.focus.destroy();
        self.on_open = None;
        self.on_close = None;
        self.on_command_execute = None;
    }

    /// Whether [`CommandPalette::destroy`] has been called.
    pub fn is_destroyed(&self) -> bool {
        self.store.is_destroyed()
    }

    /// Point the focus at the first of `results` and return the cursor.
    fn refocus_first(&mut self, results: &[RankedCommand]) -> usize {
        self.focus.set_items(result_ids(results));
        self.focus.move_first();
        self.focus.focused_index().unwrap_or(0)
    }

    /// Copy the focused position into the snapshot.
    fn sync_selection(&mut self) -> bool {
        let selected = self.focus.focused_index().unwrap_or(0);
        self.store.update(|s| s.selected_index = selected)
    }

    /// Swap in a new registry and recompute results for the current query.
    /// The focus re-clamps into the new result list.
    fn replace_registry(&mut self, commands: Vec<CommandInfo>) -> bool {
        let filtered = filter_commands(&commands, &self.store.state().query);
        self.focus.set_items(result_ids(&filtered));
        let selected = self.focus.focused_index().unwrap_or(0);
        self.store.update(|s| {
            s.commands = commands;
            s.filtered_commands = filtered;
            s.selected_index = selected;
        })
    }
}

impl Pattern for CommandPalette {
    type State = CommandPaletteState;

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

/// Insert `info`, or replace the entry with the same id in place.
fn upsert(commands: &mut Vec<CommandInfo>, info: CommandInfo) {
    match commands.iter_mut().find(|command| command.id == info.id) {
        Some(existing) => *existing = info,
        None => commands.push(info),
    }
}

fn result_ids(results: &[RankedCommand]) -> Vec<String> {
    results.iter().map(|ranked| ranked.command.id.clone()).collect()
}

/// Rank the enabled commands matching `query`.
pub fn filter_commands(commands: &[CommandInfo], query: &str) -> Vec<RankedCommand> {
    let query = fuzzy::normalize_query(query);
    let mut matches: Vec<(usize, fuzzy::FuzzyMatch, &CommandInfo)> = commands
        .iter()
        .enumerate()
        .filter(|(_, command)| !command.disabled)
        .filter_map(|(order, command)| {
            fuzzy::fuzzy_match(&query, &command.label, &command.searchable_text())
                .map(|m| (order, m, command))
        })
        .collect();
    matches.sort_by(|(a_order, a, _), (b_order, b, _)| a.rank(b).then(a_order.cmp(b_order)));

    matches
        .into_iter()
        .map(|(_, m, command)| {
            let label_len = command.label.chars().count();
            RankedCommand {
                command: command.clone(),
                highlights: m.positions.into_iter().filter(|p| *p < label_len).collect(),
            }
        })
        .collect()
}
