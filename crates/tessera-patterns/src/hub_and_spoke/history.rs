//! Navigation history entries and the host history bridge.
//!
//! A [`HistoryBridge`] mirrors hub/spoke transitions into a host history
//! stack, such as the browser's. The engine pushes an entry on every
//! forward transition. When the host pops its own history (the back
//! button), it hands the popped entry to [`super::HubAndSpoke::pop_state`],
//! which replays it without pushing again.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use serde::Serialize;

/// One navigation step: the hub, or a spoke by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "id")]
pub enum HistoryEntry {
    /// The hub screen.
    Hub,
    /// A spoke screen.
    Spoke(String),
}

impl HistoryEntry {
    /// Spoke id, or `None` for the hub.
    pub fn spoke_id(&self) -> Option<&str> {
        match self {
            Self::Hub => None,
            Self::Spoke(id) => Some(id),
        }
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hub => f.write_str("hub"),
            Self::Spoke(id) => f.write_str(id),
        }
    }
}

/// Host history stack the engine mirrors transitions into.
pub trait HistoryBridge: Send {
    /// Record a forward transition.
    fn push(&mut self, entry: &HistoryEntry);

    /// Start delivering pops. Called once when the engine is created.
    fn listen(&mut self);

    /// Stop delivering pops. Called once when the engine is destroyed.
    fn unlisten(&mut self);
}

#[derive(Debug, Default)]
struct MemoryInner {
    entries: Vec<HistoryEntry>,
    index: Option<usize>,
    listening: bool,
}

/// In-memory [`HistoryBridge`] with browser-style back and forward.
///
/// Clones share one stack, so a test or host can keep a handle while the
/// engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries pushed so far, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.with(|inner| inner.entries.clone())
    }

    /// Entry under the cursor.
    pub fn current(&self) -> Option<HistoryEntry> {
        self.with(|inner| inner.index.and_then(|i| inner.entries.get(i)).cloned())
    }

    /// Whether the engine is listening for pops.
    pub fn is_listening(&self) -> bool {
        self.with(|inner| inner.listening)
    }

    /// Move the cursor back one entry and return the entry to replay.
    ///
    /// Returns `None` at the start of history or when nobody listens.
    pub fn back(&self) -> Option<HistoryEntry> {
        self.with(|inner| {
            if !inner.listening {
                return None;
            }
            let index = inner.index?.checked_sub(1)?;
            inner.index = Some(index);
            inner.entries.get(index).cloned()
        })
    }

    /// Move the cursor forward one entry and return the entry to replay.
    pub fn forward(&self) -> Option<HistoryEntry> {
        self.with(|inner| {
            if !inner.listening {
                return None;
            }
            let index = inner.index.map_or(0, |i| i + 1);
            let entry = inner.entries.get(index).cloned()?;
            inner.index = Some(index);
            Some(entry)
        })
    }

    fn with<R>(&self, f: impl FnOnce(&mut MemoryInner) -> R) -> R {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner)
    }
}

impl HistoryBridge for MemoryHistory {
    fn push(&mut self, entry: &HistoryEntry) {
        self.with(|inner| {
            let keep = inner.index.map_or(0, |i| i + 1);
            inner.entries.truncate(keep);
            inner.entries.push(entry.clone());
            inner.index = Some(inner.entries.len() - 1);
        });
    }

    fn listen(&mut self) {
        self.with(|inner| inner.listening = true);
    }

    fn unlisten(&mut self) {
        self.with(|inner| inner.listening = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spoke(id: &str) -> HistoryEntry {
        HistoryEntry::Spoke(id.to_string())
    }

    #[test]
    fn back_and_forward_walk_the_stack() {
        let mut history = MemoryHistory::new();
        history.listen();
        history.push(&spoke("a"));
        history.push(&spoke("b"));

        assert_eq!(history.back(), Some(spoke("a")));
        assert_eq!(history.back(), None);
        assert_eq!(history.forward(), Some(spoke("b")));
        assert_eq!(history.forward(), None);
    }

    #[test]
    fn push_after_back_drops_forward_entries() {
        let mut history = MemoryHistory::new();
        history.listen();
        history.push(&spoke("a"));
        history.push(&spoke("b"));
        history.back();
        history.push(&HistoryEntry::Hub);
        assert_eq!(history.entries(), vec![spoke("a"), HistoryEntry::Hub]);
    }

    #[test]
    fn pops_require_listener() {
        let mut history = MemoryHistory::new();
        history.push(&spoke("a"));
        history.push(&spoke("b"));
        assert_eq!(history.back(), None);
        assert_eq!(history.current(), Some(spoke("b")));
    }

    #[test]
    fn entries_serialize_tagged() {
        let json = serde_json::to_value(spoke("mail")).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "spoke", "id": "mail" }));
        assert_eq!(HistoryEntry::Hub.to_string(), "hub");
    }
}
