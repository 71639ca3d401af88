//! Property-based tests for grid breakpoints and navigation.
//!
//! Breakpoint resolution is checked against an independent oracle, and
//! navigation against the round-trip and wrap-boundary properties. The
//! grid invariants are checked after every generated operation.

use proptest::prelude::*;
use tessera_harness::{GridOp, InvariantRegistry, apply_grid, grid_items};
use tessera_patterns::{Breakpoint, GridLayout, GridLayoutOptions, GridState};

#[allow(clippy::ptr_arg)]
fn item_id(item: &String) -> String {
    item.clone()
}

fn grid(len: usize, columns: usize, wrap: bool, focused: usize) -> GridLayout<String> {
    let options =
        GridLayoutOptions::new(grid_items(len), item_id, vec![Breakpoint::new(0.0, columns)])
            .wrap(wrap)
            .initial_focused_index(focused);
    GridLayout::new(options).unwrap()
}

/// Grid shape plus an index inside it.
fn shape() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..40, 1usize..8).prop_flat_map(|(len, columns)| (Just(len), Just(columns), 0..len))
}

fn breakpoint_strategy() -> impl Strategy<Value = Breakpoint> {
    (0u16..2000, 1usize..8).prop_map(|(min, columns)| Breakpoint::new(f64::from(min), columns))
}

/// Independent oracle: widest fitting breakpoint, earliest declared among
/// equal widths, or the narrowest when nothing fits.
fn expected_columns(breakpoints: &[Breakpoint], width: f64) -> usize {
    let mut fitting: Option<&Breakpoint> = None;
    for candidate in breakpoints.iter().filter(|b| b.min_width <= width) {
        if fitting.is_none_or(|best| candidate.min_width > best.min_width) {
            fitting = Some(candidate);
        }
    }
    if let Some(found) = fitting {
        return found.columns;
    }
    let mut narrowest = &breakpoints[0];
    for candidate in breakpoints {
        if candidate.min_width < narrowest.min_width {
            narrowest = candidate;
        }
    }
    narrowest.columns
}

proptest! {
    /// Columns always come from the widest breakpoint that fits.
    #[test]
    fn prop_breakpoint_resolution(
        breakpoints in prop::collection::vec(breakpoint_strategy(), 1..6),
        widths in prop::collection::vec(0u16..3000, 1..10),
    ) {
        let options = GridLayoutOptions::new(grid_items(4), item_id, breakpoints.clone());
        let mut grid = GridLayout::new(options).unwrap();
        let invariants =
            InvariantRegistry::<GridState<String>>::grid_with_breakpoints(item_id, breakpoints.clone());

        for width in widths {
            let width = f64::from(width);
            grid.set_viewport_width(width);
            prop_assert_eq!(grid.state().columns, expected_columns(&breakpoints, width));
            prop_assert!(invariants.check_all(grid.state()).is_ok());
        }
    }

    /// Up then down returns to the start from any index with a row above.
    #[test]
    fn prop_vertical_round_trip((len, columns, index) in shape(), wrap in any::<bool>()) {
        prop_assume!(index >= columns);
        let mut grid = grid(len, columns, wrap, index);
        prop_assert!(grid.navigate_up());
        prop_assert!(grid.navigate_down());
        prop_assert_eq!(grid.state().focused_index, Some(index));
    }

    /// Left then right returns to the start from any index but the first.
    #[test]
    fn prop_horizontal_round_trip((len, columns, index) in shape(), wrap in any::<bool>()) {
        prop_assume!(index > 0);
        let mut grid = grid(len, columns, wrap, index);
        prop_assert!(grid.navigate_left());
        prop_assert!(grid.navigate_right());
        prop_assert_eq!(grid.state().focused_index, Some(index));
    }

    /// Without wrap, moves past an edge do nothing.
    #[test]
    fn prop_no_wrap_edges_are_walls((len, columns, index) in shape()) {
        let mut grid = grid(len, columns, false, index);
        let on_first_row = index < columns;
        let on_last_row = index + columns >= len;

        if on_first_row {
            prop_assert!(!grid.navigate_up());
        }
        if on_last_row {
            prop_assert!(!grid.navigate_down());
        }
        if index == 0 {
            prop_assert!(!grid.navigate_left());
        }
        if index == len - 1 {
            prop_assert!(!grid.navigate_right());
        }
        prop_assert_eq!(grid.state().focused_index, Some(index));
    }

    /// With wrap, moves past an edge land on the opposite edge.
    #[test]
    fn prop_wrap_jumps_to_opposite_edge((len, columns, index) in shape()) {
        prop_assume!(len > 1);
        let column = index % columns;
        let last_row_start = (len - 1) / columns * columns;

        if index < columns {
            let mut grid = grid(len, columns, true, index);
            grid.navigate_up();
            let target = grid.state().focused_index.unwrap();
            prop_assert!(target >= last_row_start);
            prop_assert_eq!(target, (last_row_start + column).min(len - 1));
        }
        if index + columns >= len {
            let mut grid = grid(len, columns, true, index);
            grid.navigate_down();
            prop_assert_eq!(grid.state().focused_index, Some(column));
        }

        let mut first = grid(len, columns, true, 0);
        prop_assert!(first.navigate_left());
        prop_assert_eq!(first.state().focused_index, Some(len - 1));

        let mut last = grid(len, columns, true, len - 1);
        prop_assert!(last.navigate_right());
        prop_assert_eq!(last.state().focused_index, Some(0));
    }

    /// Grid invariants hold under arbitrary operation sequences.
    #[test]
    fn prop_grid_invariants_hold(
        len in 0usize..64,
        seed in any::<u64>(),
    ) {
        let breakpoints = vec![
            Breakpoint::new(0.0, 1),
            Breakpoint::new(480.0, 2),
            Breakpoint::new(960.0, 4),
        ];
        let options = GridLayoutOptions::new(grid_items(10), item_id, breakpoints.clone());
        let mut grid = GridLayout::new(options).unwrap();
        let invariants = InvariantRegistry::grid_with_breakpoints(item_id, breakpoints);

        let generated: Vec<GridOp> = tessera_harness::seeded_ops(seed, len);
        for op in &generated {
            apply_grid(&mut grid, op);
            invariants.assert_all(grid.state(), &format!("after {op:?}"));
        }
    }
}

#[test]
fn wrapping_right_from_last_item_returns_to_first() {
    let mut grid = grid(6, 3, true, 5);
    assert!(grid.navigate_right());
    assert_eq!(grid.state().focused_index, Some(0));
}
