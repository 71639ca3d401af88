//! Model-based testing support.
//!
//! [`operation`] defines generated host actions and how to apply them to
//! the real engines. The reference models here are deliberately naive
//! re-implementations; property tests apply the same operations to both
//! and compare what they observe.

pub mod operation;

pub use operation::{
    Arrow, GridOp, HubOp, ModalOp, PaletteOp, TabOp, ToastOp, apply_grid, apply_hub, apply_modal,
    apply_palette, apply_tabs, apply_toasts, grid_items, small_id,
};

/// Reference model of a priority-ordered modal stack.
///
/// Keeps entries in insertion order and computes the visible order on
/// demand, so it shares no sorting code with the engine.
#[derive(Debug, Clone, Default)]
pub struct ModelModalStack {
    // (id, priority, close_on_escape), oldest first
    entries: Vec<(String, i32, bool)>,
}

impl ModelModalStack {
    /// Empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the model semantics of `op`.
    pub fn apply(&mut self, op: &ModalOp) {
        match *op {
            ModalOp::Open { id, priority, close_on_escape } => {
                let id = small_id("modal", id);
                let priority = i32::from(priority);
                match self.entries.iter_mut().find(|entry| entry.0 == id) {
                    Some(entry) => {
                        entry.1 = priority;
                        entry.2 = close_on_escape;
                    },
                    None => self.entries.push((id, priority, close_on_escape)),
                }
            },
            ModalOp::Close(id) => {
                let id = small_id("modal", id);
                self.entries.retain(|entry| entry.0 != id);
            },
            ModalOp::CloseTop => {
                if let Some(top) = self.top() {
                    self.entries.retain(|entry| entry.0 != top);
                }
            },
            ModalOp::CloseAll => self.entries.clear(),
            ModalOp::Escape => {
                let closable = self.ordered().first().filter(|entry| entry.2).map(|e| e.0.clone());
                if let Some(top) = closable {
                    self.entries.retain(|entry| entry.0 != top);
                }
            },
            ModalOp::Backdrop(id) => {
                // Every generated modal keeps the default backdrop flag.
                let id = small_id("modal", id);
                self.entries.retain(|entry| entry.0 != id);
            },
        }
    }

    /// Ids from top to bottom.
    pub fn ids(&self) -> Vec<String> {
        self.ordered().into_iter().map(|entry| entry.0.clone()).collect()
    }

    /// Id of the top modal: highest priority, earliest opened among ties.
    pub fn top(&self) -> Option<String> {
        let mut best: Option<&(String, i32, bool)> = None;
        for entry in &self.entries {
            if best.is_none_or(|current| entry.1 > current.1) {
                best = Some(entry);
            }
        }
        best.map(|entry| entry.0.clone())
    }

    fn ordered(&self) -> Vec<&(String, i32, bool)> {
        let mut remaining: Vec<_> = self.entries.iter().collect();
        let mut ordered = Vec::with_capacity(remaining.len());
        while !remaining.is_empty() {
            let mut pick = 0;
            for (i, entry) in remaining.iter().enumerate() {
                if entry.1 > remaining[pick].1 {
                    pick = i;
                }
            }
            ordered.push(remaining.remove(pick));
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(id: u8, priority: i8) -> ModalOp {
        ModalOp::Open { id, priority, close_on_escape: true }
    }

    #[test]
    fn ties_go_to_the_earliest() {
        let mut model = ModelModalStack::new();
        model.apply(&open(1, 0));
        model.apply(&open(2, 0));
        model.apply(&open(3, 5));
        assert_eq!(model.ids(), vec!["modal-3", "modal-1", "modal-2"]);
        assert_eq!(model.top().as_deref(), Some("modal-3"));
    }

    #[test]
    fn reopening_keeps_position_among_ties() {
        let mut model = ModelModalStack::new();
        model.apply(&open(1, 0));
        model.apply(&open(2, 0));
        model.apply(&open(1, 0));
        assert_eq!(model.top().as_deref(), Some("modal-1"));
    }

    #[test]
    fn escape_respects_flag() {
        let mut model = ModelModalStack::new();
        model.apply(&ModalOp::Open { id: 1, priority: 0, close_on_escape: false });
        model.apply(&ModalOp::Escape);
        assert_eq!(model.ids(), vec!["modal-1"]);
    }
}
