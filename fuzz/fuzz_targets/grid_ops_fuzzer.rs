//! Fuzz target for grid navigation and selection
//!
//! # Strategy
//!
//! - Breakpoint tables: up to eight arbitrary (min width, columns) pairs,
//!   including duplicates and zero columns
//! - Operation sequences: navigation, selection, viewport resizes, item
//!   count changes and wrap toggles in any order
//!
//! # Invariants
//!
//! - Focus stays in bounds, or is absent only for an empty grid
//! - Selection only names current items
//! - Columns always match the widest fitting breakpoint
//! - NEVER panic on any table or sequence

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tessera_harness::{GridOp, InvariantRegistry, apply_grid, grid_items};
use tessera_patterns::{Breakpoint, GridLayout, GridLayoutOptions};

#[derive(Debug, Clone, Arbitrary)]
struct GridScenario {
    items: u8,
    breakpoints: Vec<(u16, u8)>,
    ops: Vec<GridOp>,
}

fn item_id(item: &String) -> String {
    item.clone()
}

fuzz_target!(|scenario: GridScenario| {
    let breakpoints: Vec<Breakpoint> = scenario
        .breakpoints
        .iter()
        .take(8)
        .map(|&(min, columns)| Breakpoint::new(f64::from(min), usize::from(columns)))
        .collect();
    let options =
        GridLayoutOptions::new(grid_items(usize::from(scenario.items % 64)), item_id, breakpoints.clone());

    // Empty tables and zero columns are rejected up front.
    let Ok(mut grid) = GridLayout::new(options) else {
        return;
    };
    let invariants = InvariantRegistry::grid_with_breakpoints(item_id, breakpoints);

    for op in scenario.ops.iter().take(256) {
        apply_grid(&mut grid, op);
        invariants.assert_all(grid.state(), &format!("after {op:?}"));
    }
});
