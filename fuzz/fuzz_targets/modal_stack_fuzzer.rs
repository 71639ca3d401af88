//! Fuzz target for the modal stack
//!
//! Drives the engine and a naive reference stack with the same operations.
//!
//! # Invariants
//!
//! - Stack is sorted by descending priority with no duplicate ids
//! - `top_modal_id` is the stack head
//! - Engine and reference agree on order after every operation

#![no_main]

use libfuzzer_sys::fuzz_target;
use tessera_harness::{InvariantRegistry, ModalOp, ModelModalStack, apply_modal};
use tessera_patterns::{Modal, ModalOptions, ModalState};

fuzz_target!(|ops: Vec<ModalOp>| {
    let mut modal: Modal<()> = Modal::new(ModalOptions::default());
    let mut model = ModelModalStack::new();
    let invariants = InvariantRegistry::<ModalState<()>>::standard();

    for op in ops.iter().take(256) {
        apply_modal(&mut modal, op);
        model.apply(op);
        invariants.assert_all(modal.state(), &format!("after {op:?}"));

        let ids: Vec<String> = modal.state().stack.iter().map(|entry| entry.id.clone()).collect();
        assert_eq!(ids, model.ids(), "stack diverged after {op:?}");
    }
});
