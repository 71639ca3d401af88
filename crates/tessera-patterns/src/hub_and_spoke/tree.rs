//! Spoke tree and the pure functions over it.
//!
//! Spokes nest through `sub_spokes`. Lookups walk the tree depth-first in
//! declaration order and the first match wins, since ids are only required
//! to be unique among siblings. Edits return a new tree and leave the input
//! untouched.

use serde::Serialize;

/// A navigable destination, possibly with nested destinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Spoke {
    /// Spoke id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Optional badge text, such as an unread count.
    pub badge: Option<String>,
    /// Nested spokes.
    pub sub_spokes: Vec<Spoke>,
}

impl Spoke {
    /// Leaf spoke.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into(), badge: None, sub_spokes: Vec::new() }
    }

    /// Set the badge.
    #[must_use]
    pub fn badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }

    /// Set the nested spokes.
    #[must_use]
    pub fn sub_spokes(mut self, sub_spokes: Vec<Spoke>) -> Self {
        self.sub_spokes = sub_spokes;
        self
    }
}

/// First spoke with `id`, depth-first.
pub fn find_spoke<'a>(spokes: &'a [Spoke], id: &str) -> Option<&'a Spoke> {
    spokes.iter().find_map(|spoke| {
        if spoke.id == id { Some(spoke) } else { find_spoke(&spoke.sub_spokes, id) }
    })
}

/// Whether `target` is `root` or appears somewhere beneath it.
pub fn subtree_contains(root: &Spoke, target: &str) -> bool {
    root.id == target || find_spoke(&root.sub_spokes, target).is_some()
}

/// The tree with every spoke named `id` removed, along with its subtree.
pub fn remove_spoke(spokes: &[Spoke], id: &str) -> Vec<Spoke> {
    spokes
        .iter()
        .filter(|spoke| spoke.id != id)
        .map(|spoke| Spoke { sub_spokes: remove_spoke(&spoke.sub_spokes, id), ..spoke.clone() })
        .collect()
}

/// The tree with `spoke` appended at the top level, or under the first
/// spoke named `parent`.
///
/// Returns `None` if `parent` is given but absent.
pub fn add_spoke(spokes: &[Spoke], spoke: Spoke, parent: Option<&str>) -> Option<Vec<Spoke>> {
    let Some(parent) = parent else {
        let mut next = spokes.to_vec();
        next.push(spoke);
        return Some(next);
    };
    let mut next = spokes.to_vec();
    insert_under(&mut next, spoke, parent).ok().map(|()| next)
}

/// Push `spoke` under the first node named `parent`, handing it back if no
/// such node exists.
fn insert_under(spokes: &mut [Spoke], spoke: Spoke, parent: &str) -> Result<(), Spoke> {
    let mut spoke = spoke;
    for node in spokes.iter_mut() {
        if node.id == parent {
            node.sub_spokes.push(spoke);
            return Ok(());
        }
        match insert_under(&mut node.sub_spokes, spoke, parent) {
            Ok(()) => return Ok(()),
            Err(returned) => spoke = returned,
        }
    }
    Err(spoke)
}

/// Total number of spokes in the tree.
pub fn count_spokes(spokes: &[Spoke]) -> usize {
    spokes.iter().map(|spoke| 1 + count_spokes(&spoke.sub_spokes)).sum()
}
