//! Property-based tests for wizard completion and navigation.
//!
//! Every step requires its own field. Completion must only reach the
//! `on_complete` callback when every field is present, and otherwise land
//! on the first step whose field is missing.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use proptest::prelude::*;
use serde_json::{Map, Value, json};
use tessera_core::{CallbackError, CallbackResult};
use tessera_harness::InvariantRegistry;
use tessera_patterns::{Step, Wizard, WizardOptions, WizardState};

fn field(index: usize) -> String {
    format!("field-{index}")
}

fn steps(count: usize) -> Vec<Step> {
    (0..count)
        .map(|index| {
            Step::new(format!("step-{index}"), format!("Step {index}")).validate(move |data| {
                (!data.contains_key(&field(index))).then(|| format!("{} is required", field(index)))
            })
        })
        .collect()
}

fn data_with(present: &[bool]) -> Map<String, Value> {
    present
        .iter()
        .enumerate()
        .filter(|(_, present)| **present)
        .map(|(index, _)| (field(index), json!(index)))
        .collect()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().build().unwrap()
}

#[derive(Debug, Clone)]
enum WizardOp {
    Next,
    Previous,
    GoTo(usize),
    SetField(usize),
    Complete,
    Reset,
}

fn wizard_op() -> impl Strategy<Value = WizardOp> {
    prop_oneof![
        3 => Just(WizardOp::Next),
        2 => Just(WizardOp::Previous),
        1 => (0usize..8).prop_map(WizardOp::GoTo),
        3 => (0usize..6).prop_map(WizardOp::SetField),
        1 => Just(WizardOp::Complete),
        1 => Just(WizardOp::Reset),
    ]
}

proptest! {
    /// `on_complete` runs only when every step validates; otherwise the
    /// first failing step becomes current.
    #[test]
    fn prop_completion_gate(
        present in prop::collection::vec(any::<bool>(), 1..8),
        start in any::<prop::sample::Index>(),
    ) {
        let count = present.len();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let options = WizardOptions::new(steps(count))
            .initial_data(data_with(&present))
            .initial_step_index(start.index(count))
            .with_on_complete(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { CallbackResult::Ok(()) }
            });
        let mut wizard = Wizard::new(options).unwrap();

        let completed = runtime().block_on(wizard.complete_wizard());

        match present.iter().position(|present| !present) {
            Some(first_missing) => {
                prop_assert!(!completed);
                prop_assert_eq!(calls.load(Ordering::SeqCst), 0);
                prop_assert_eq!(wizard.state().current_step_index, first_missing);
                prop_assert!(!wizard.state().can_proceed);
                prop_assert!(!wizard.state().is_complete);
                let expected = format!("{} is required", field(first_missing));
                prop_assert_eq!(wizard.state().validation_error.as_deref(), Some(expected.as_str()));
            },
            None => {
                prop_assert!(completed);
                prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
                prop_assert!(wizard.state().is_complete);
                prop_assert!(wizard.state().completed_steps.is_empty());
            },
        }
    }

    /// Moving forward never skips past a step whose field is missing.
    #[test]
    fn prop_next_stops_at_missing_field(present in prop::collection::vec(any::<bool>(), 1..8)) {
        let count = present.len();
        let mut wizard =
            Wizard::new(WizardOptions::new(steps(count)).initial_data(data_with(&present))).unwrap();
        let rt = runtime();
        while rt.block_on(wizard.go_to_next_step()) {}

        let stop = present.iter().position(|present| !present).unwrap_or(count - 1);
        prop_assert_eq!(wizard.state().current_step_index, stop);
        let passed: Vec<usize> = (0..stop).collect();
        prop_assert_eq!(&wizard.state().completed_steps[..stop], &passed[..]);
    }

    /// Wizard invariants hold under arbitrary navigation and data edits.
    /// Completed steps only ever grow and collected fields are never lost.
    #[test]
    fn prop_wizard_invariants_hold(
        count in 1usize..6,
        ops in prop::collection::vec(wizard_op(), 0..60),
    ) {
        let mut wizard = Wizard::new(WizardOptions::new(steps(count))).unwrap();
        let invariants = InvariantRegistry::<WizardState>::standard();
        let rt = runtime();

        for op in &ops {
            let completed_before = wizard.state().completed_steps.clone();
            let data_before = wizard.state().data.clone();
            match *op {
                WizardOp::Next => {
                    rt.block_on(wizard.go_to_next_step());
                },
                WizardOp::Previous => {
                    wizard.go_to_previous_step();
                },
                WizardOp::GoTo(index) => {
                    wizard.go_to_step(index);
                },
                WizardOp::SetField(index) => {
                    wizard.set_field(&field(index), json!(true));
                },
                WizardOp::Complete => {
                    rt.block_on(wizard.complete_wizard());
                },
                WizardOp::Reset => {
                    wizard.reset();
                },
            }
            invariants.assert_all(wizard.state(), &format!("after {op:?}"));

            let state = wizard.state();
            prop_assert!(state.completed_steps.starts_with(&completed_before));
            let grew = state.completed_steps.len() > completed_before.len();
            prop_assert!(!grew || matches!(op, WizardOp::Next));
            prop_assert!(data_before.keys().all(|key| state.data.contains_key(key)));
        }
    }
}

#[test]
fn failing_completion_callback_leaves_wizard_incomplete() {
    let options = WizardOptions::new(steps(2))
        .initial_data(data_with(&[true, true]))
        .with_on_complete(|_| async { CallbackResult::Err(CallbackError::new("backend down")) });
    let mut wizard = Wizard::new(options).unwrap();

    assert!(!runtime().block_on(wizard.complete_wizard()));
    assert!(!wizard.state().is_complete);
}
