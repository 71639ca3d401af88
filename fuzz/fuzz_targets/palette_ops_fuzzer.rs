//! Fuzz target for command palette filtering and selection
//!
//! # Strategy
//!
//! - Register, replace and unregister commands, some disabled
//! - Interleave queries with selection moves and open/close toggles
//!
//! # Invariants
//!
//! - Selection points into the results, or is zero with no results
//! - Results only list registered, enabled commands

#![no_main]

use libfuzzer_sys::fuzz_target;
use tessera_harness::{InvariantRegistry, PaletteOp, apply_palette};
use tessera_patterns::{CommandPalette, CommandPaletteOptions, CommandPaletteState};

fuzz_target!(|ops: Vec<PaletteOp>| {
    let mut palette = CommandPalette::new(CommandPaletteOptions::new(Vec::new()));
    let invariants = InvariantRegistry::<CommandPaletteState>::standard();

    for op in ops.iter().take(256) {
        apply_palette(&mut palette, op);
        invariants.assert_all(palette.state(), &format!("after {op:?}"));
    }
});
