//! Responsive breakpoint tables.
//!
//! A table is validated and normalized once: sorted ascending by
//! `min_width` with duplicate widths removed (the first declaration wins).
//! Resolution then picks the last entry whose `min_width` fits the viewport.

use serde::Serialize;

use crate::error::GridError;

/// A `(min_width, columns)` pair selecting the column count for a viewport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    /// Optional display name, e.g. `"md"`.
    pub name: Option<String>,
    /// Smallest viewport width this breakpoint applies to.
    pub min_width: f64,
    /// Column count while this breakpoint is active.
    pub columns: usize,
}

impl Breakpoint {
    /// Unnamed breakpoint.
    pub fn new(min_width: f64, columns: usize) -> Self {
        Self { name: None, min_width, columns }
    }

    /// Named breakpoint.
    pub fn named(name: impl Into<String>, min_width: f64, columns: usize) -> Self {
        Self { name: Some(name.into()), min_width, columns }
    }
}

/// Validate and normalize a breakpoint table.
///
/// # Errors
///
/// - [`GridError::EmptyBreakpoints`] if `breakpoints` is empty
/// - [`GridError::InvalidMinWidth`] if any `min_width` is negative or not
///   finite
/// - [`GridError::ZeroColumns`] if any entry has zero columns
pub fn normalize(mut breakpoints: Vec<Breakpoint>) -> Result<Vec<Breakpoint>, GridError> {
    if breakpoints.is_empty() {
        return Err(GridError::EmptyBreakpoints);
    }
    for breakpoint in &breakpoints {
        if !breakpoint.min_width.is_finite() || breakpoint.min_width < 0.0 {
            return Err(GridError::InvalidMinWidth { min_width: breakpoint.min_width });
        }
        if breakpoint.columns == 0 {
            return Err(GridError::ZeroColumns { min_width: breakpoint.min_width });
        }
    }

    breakpoints.sort_by(|a, b| a.min_width.total_cmp(&b.min_width));
    breakpoints.dedup_by(|later, earlier| later.min_width == earlier.min_width);
    Ok(breakpoints)
}

/// Resolve the active breakpoint for `viewport_width`.
///
/// `breakpoints` must be normalized and non-empty. When no entry fits, the
/// smallest one applies.
pub fn resolve(breakpoints: &[Breakpoint], viewport_width: f64) -> Option<&Breakpoint> {
    breakpoints
        .iter()
        .rev()
        .find(|breakpoint| breakpoint.min_width <= viewport_width)
        .or_else(|| breakpoints.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<Breakpoint> {
        vec![Breakpoint::new(1024.0, 4), Breakpoint::new(0.0, 1), Breakpoint::new(640.0, 2)]
    }

    #[test]
    fn normalize_sorts_ascending() {
        let normalized = normalize(table()).unwrap();
        let widths: Vec<f64> = normalized.iter().map(|b| b.min_width).collect();
        assert_eq!(widths, vec![0.0, 640.0, 1024.0]);
    }

    #[test]
    fn normalize_dedups_keeping_first() {
        let normalized =
            normalize(vec![Breakpoint::new(0.0, 1), Breakpoint::new(0.0, 9)]).unwrap();
        assert_eq!(normalized, vec![Breakpoint::new(0.0, 1)]);
    }

    #[test]
    fn normalize_rejects_invalid_tables() {
        assert_eq!(normalize(Vec::new()), Err(GridError::EmptyBreakpoints));
        assert!(matches!(
            normalize(vec![Breakpoint::new(-1.0, 2)]),
            Err(GridError::InvalidMinWidth { .. })
        ));
        assert!(matches!(
            normalize(vec![Breakpoint::new(0.0, 0)]),
            Err(GridError::ZeroColumns { .. })
        ));
    }

    #[test]
    fn resolve_picks_largest_fitting() {
        let normalized = normalize(table()).unwrap();
        assert_eq!(resolve(&normalized, 0.0).map(|b| b.columns), Some(1));
        assert_eq!(resolve(&normalized, 639.9).map(|b| b.columns), Some(1));
        assert_eq!(resolve(&normalized, 640.0).map(|b| b.columns), Some(2));
        assert_eq!(resolve(&normalized, 5000.0).map(|b| b.columns), Some(4));
    }

    #[test]
    fn resolve_falls_back_to_smallest() {
        let normalized = normalize(vec![Breakpoint::new(300.0, 2)]).unwrap();
        assert_eq!(resolve(&normalized, 10.0).map(|b| b.columns), Some(2));
    }
}
