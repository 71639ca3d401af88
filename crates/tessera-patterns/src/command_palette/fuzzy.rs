//! Fuzzy subsequence matching and ranking.
//!
//! A query matches a text if every query character appears in the text in
//! order, case-insensitively, not necessarily contiguously. Matches are
//! ranked by:
//!
//! 1. exact (case-insensitive) label equality
//! 2. position of the first matched character (earlier is better)
//! 3. span from first to last matched character (denser is better)
//! 4. registration order

use std::cmp::Ordering;

/// Result of matching one query against one searchable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    /// The query equals the label, ignoring case.
    pub exact: bool,
    /// Char index of the first matched character.
    pub first: usize,
    /// Distance between the first and last matched characters.
    pub span: usize,
    /// Char indices of every matched character within the original
    /// (not lowercased) searchable text.
    pub positions: Vec<usize>,
}

impl FuzzyMatch {
    /// Ordering where the better match sorts first.
    pub fn rank(&self, other: &Self) -> Ordering {
        other
            .exact
            .cmp(&self.exact)
            .then(self.first.cmp(&other.first))
            .then(self.span.cmp(&other.span))
    }
}

/// Lowercase and trim a query for matching.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Match `query` (already normalized) against `text`.
///
/// `label` is the part of the text compared for exact equality. An empty
/// query matches everything with a neutral score.
pub fn fuzzy_match(query: &str, label: &str, text: &str) -> Option<FuzzyMatch> {
    let exact = !query.is_empty() && label.to_lowercase() == query;
    if query.is_empty() {
        return Some(FuzzyMatch { exact, first: 0, span: 0, positions: Vec::new() });
    }

    // Some chars lowercase to several; each keeps its source char index.
    let haystack: Vec<(usize, char)> = text
        .chars()
        .enumerate()
        .flat_map(|(index, c)| c.to_lowercase().map(move |lower| (index, lower)))
        .collect();
    let mut positions: Vec<usize> = Vec::with_capacity(query.chars().count());
    let mut cursor = 0;
    for needle in query.chars() {
        let offset = haystack[cursor..].iter().position(|(_, c)| *c == needle)?;
        let (index, _) = haystack[cursor + offset];
        if positions.last() != Some(&index) {
            positions.push(index);
        }
        cursor += offset + 1;
    }

    let first = positions.first().copied().unwrap_or(0);
    let last = positions.last().copied().unwrap_or(first);
    Some(FuzzyMatch { exact, first, span: last - first, positions })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsequence_need_not_be_contiguous() {
        let m = fuzzy_match("opf", "Open File", "Open File").unwrap();
        assert_eq!(m.positions, vec![0, 1, 5]);
        assert!(!m.exact);
    }

    #[test]
    fn out_of_order_characters_do_not_match() {
        assert!(fuzzy_match("fo", "of", "of").is_none());
    }

    #[test]
    fn matching_ignores_case() {
        assert!(fuzzy_match("save", "SAVE", "SAVE").unwrap().exact);
    }

    #[test]
    fn exact_label_ranks_before_earlier_matches() {
        let exact = fuzzy_match("save", "Save", "Save File").unwrap();
        let prefix = fuzzy_match("save", "Save As", "Save As File").unwrap();
        let buried = fuzzy_match("save", "Enable Autosave", "Enable Autosave").unwrap();

        assert_eq!(exact.rank(&prefix), Ordering::Less);
        assert_eq!(prefix.rank(&buried), Ordering::Less);
    }

    #[test]
    fn denser_match_ranks_higher() {
        let dense = fuzzy_match("ab", "ab", "ab").unwrap();
        let sparse = fuzzy_match("ab", "a-b", "a-b").unwrap();
        assert_eq!(dense.rank(&sparse), Ordering::Less);
    }

    #[test]
    fn positions_index_the_original_text() {
        // 'İ' lowercases to two chars.
        let m = fuzzy_match("ist", "İstanbul", "İstanbul").unwrap();
        assert_eq!(m.positions, vec![0, 1, 2]);
        assert_eq!(m.span, 2);

        let m = fuzzy_match("bul", "İİ bul", "İİ bul").unwrap();
        assert_eq!(m.positions, vec![3, 4, 5]);
    }

    #[test]
    fn empty_query_matches_everything() {
        let m = fuzzy_match("", "Anything", "Anything").unwrap();
        assert!(!m.exact);
        assert!(m.positions.is_empty());
    }
}
