//! Property-based tests for tabs and hub-and-spoke navigation.
//!
//! Both engines re-derive cursors after structural edits; the invariants
//! catch any edit that leaves a cursor pointing at nothing.

use proptest::prelude::*;
use tessera_harness::{HubOp, InvariantRegistry, TabOp, apply_hub, apply_tabs};
use tessera_patterns::{
    ActivationMode, HistoryEntry, HubAndSpoke, HubAndSpokeOptions, HubState, MemoryHistory, Spoke,
    Tab, TabbedInterface, TabbedInterfaceOptions, TabsState,
};

fn tab_list() -> Vec<Tab> {
    (0..4).map(|i| Tab::new(format!("tab-{i}"), format!("Tab {i}"))).collect()
}

fn spokes() -> Vec<Spoke> {
    vec![
        Spoke::new("spoke-0", "Zero").sub_spokes(vec![Spoke::new("spoke-1", "One")]),
        Spoke::new("spoke-2", "Two"),
        Spoke::new("spoke-3", "Three"),
    ]
}

proptest! {
    /// Tab invariants hold under arbitrary operation sequences.
    #[test]
    fn prop_tab_invariants_hold(seed in any::<u64>(), len in 0usize..80, manual in any::<bool>()) {
        let mode = if manual { ActivationMode::Manual } else { ActivationMode::Automatic };
        let mut tabs = TabbedInterface::new(TabbedInterfaceOptions::new(tab_list()).activation_mode(mode));
        let invariants = InvariantRegistry::<TabsState>::standard();

        for op in tessera_harness::seeded_ops::<TabOp>(seed, len) {
            apply_tabs(&mut tabs, &op);
            invariants.assert_all(tabs.state(), &format!("after {op:?}"));
        }
    }

    /// In automatic mode, focusing an enabled tab activates it.
    #[test]
    fn prop_automatic_activation_follows_focus(moves in prop::collection::vec(0usize..4, 1..20)) {
        let mut tabs = TabbedInterface::new(TabbedInterfaceOptions::new(tab_list()));
        for index in moves {
            tabs.focus_tab(index);
            let expected = format!("tab-{index}");
            prop_assert_eq!(tabs.state().active_tab_id.as_deref(), Some(expected.as_str()));
        }
    }

    /// Hub invariants hold under arbitrary operation sequences.
    #[test]
    fn prop_hub_invariants_hold(seed in any::<u64>(), len in 0usize..80) {
        let mut hub = HubAndSpoke::new(HubAndSpokeOptions::new(spokes()));
        let invariants = InvariantRegistry::<HubState>::standard();

        for op in tessera_harness::seeded_ops::<HubOp>(seed, len) {
            apply_hub(&mut hub, &op);
            invariants.assert_all(hub.state(), &format!("after {op:?}"));
        }
    }

    /// The bridge sees exactly the forward transitions, never `go_back` or
    /// replayed pops.
    #[test]
    fn prop_bridge_mirrors_forward_transitions(seed in any::<u64>(), len in 0usize..60) {
        let history = MemoryHistory::new();
        let mut hub =
            HubAndSpoke::new(HubAndSpokeOptions::new(spokes()).with_history(history.clone()));
        let mut pushed = 0usize;

        for op in tessera_harness::seeded_ops::<HubOp>(seed, len) {
            let before = hub.state().navigation_history.len();
            let forward = matches!(op, HubOp::Activate(_) | HubOp::ReturnToHub | HubOp::Remove(_));
            apply_hub(&mut hub, &op);
            let after = hub.state().navigation_history.len();
            if forward && after > before {
                pushed += 1;
            }
        }
        prop_assert_eq!(history.entries().len(), pushed);
    }
}

#[test]
fn hub_history_round_trip() {
    let mut hub = HubAndSpoke::new(HubAndSpokeOptions::new(spokes()));
    hub.activate_spoke("spoke-0");
    hub.activate_spoke("spoke-1");
    hub.return_to_hub();
    assert_eq!(
        hub.state().navigation_history,
        vec![
            HistoryEntry::Spoke("spoke-0".to_string()),
            HistoryEntry::Spoke("spoke-1".to_string()),
            HistoryEntry::Hub,
        ]
    );
    while hub.go_back() {}
    assert!(hub.state().is_on_hub);
}
