//! Fuzz target for tab and hub-and-spoke navigation
//!
//! # Invariants
//!
//! - The active tab exists and is enabled whenever any tab is enabled
//! - Tab focus stays in bounds
//! - `is_on_hub` agrees with the active spoke, which is in the tree

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tessera_harness::{HubOp, InvariantRegistry, TabOp, apply_hub, apply_tabs};
use tessera_patterns::{
    HubAndSpoke, HubAndSpokeOptions, HubState, Spoke, Tab, TabbedInterface, TabbedInterfaceOptions,
    TabsState,
};

#[derive(Debug, Clone, Arbitrary)]
enum NavigationOp {
    Tab(TabOp),
    Hub(HubOp),
}

fuzz_target!(|ops: Vec<NavigationOp>| {
    let tabs = (0..3).map(|i| Tab::new(format!("tab-{i}"), format!("Tab {i}"))).collect();
    let spokes = (0..3).map(|i| Spoke::new(format!("spoke-{i}"), format!("Spoke {i}"))).collect();
    let mut tabs = TabbedInterface::new(TabbedInterfaceOptions::new(tabs));
    let mut hub = HubAndSpoke::new(HubAndSpokeOptions::new(spokes));
    let tab_invariants = InvariantRegistry::<TabsState>::standard();
    let hub_invariants = InvariantRegistry::<HubState>::standard();

    for op in ops.iter().take(256) {
        match op {
            NavigationOp::Tab(op) => {
                apply_tabs(&mut tabs, op);
                tab_invariants.assert_all(tabs.state(), &format!("after {op:?}"));
            }
            NavigationOp::Hub(op) => {
                apply_hub(&mut hub, op);
                hub_invariants.assert_all(hub.state(), &format!("after {op:?}"));
            }
        }
    }
});
