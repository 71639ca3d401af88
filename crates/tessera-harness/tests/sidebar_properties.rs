//! Property-based tests for the sidebar shell and floating action button.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use proptest::prelude::*;
use tessera_patterns::{
    FabOptions, FloatingActionButton, ScrollDirection, SidebarOptions, SidebarShell,
};

fn section() -> impl Strategy<Value = String> {
    "[a-z]{1,12}"
}

proptest! {
    /// Choosing a section on mobile collapses an expanded sidebar in the
    /// same update; off mobile, expansion is untouched.
    #[test]
    fn prop_mobile_auto_collapse(
        section in section(),
        is_mobile in any::<bool>(),
        expanded in any::<bool>(),
    ) {
        let options = SidebarOptions::default().mobile(is_mobile).initially_expanded(expanded);
        let mut shell = SidebarShell::new(options);
        let updates = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&updates);
        shell.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        prop_assert!(shell.set_active_section(section.clone()));

        let state = shell.state();
        prop_assert_eq!(state.active_section.as_deref(), Some(section.as_str()));
        if is_mobile {
            prop_assert!(!state.is_expanded);
        } else {
            prop_assert_eq!(state.is_expanded, expanded);
        }
        prop_assert_eq!(updates.load(Ordering::SeqCst), 1);
    }

    /// Width always stays within the configured bounds.
    #[test]
    fn prop_width_stays_in_bounds(widths in prop::collection::vec(-1000.0f64..2000.0, 1..20)) {
        let mut shell = SidebarShell::default();
        let (min, max) = shell.width_bounds();
        for width in widths {
            shell.set_width(width);
            prop_assert!((min..=max).contains(&shell.state().width));
        }
    }

    /// Scroll reports derive direction from the previous offset and
    /// visibility from the threshold policy.
    #[test]
    fn prop_fab_visibility_policy(
        positions in prop::collection::vec(0.0f64..1000.0, 1..30),
        threshold in 0.0f64..500.0,
        hide_on_scroll_down in any::<bool>(),
    ) {
        let options =
            FabOptions::default().threshold(threshold).hide_on_scroll_down(hide_on_scroll_down);
        let mut fab = FloatingActionButton::new(options);
        let mut previous = 0.0;

        for position in positions {
            fab.set_scroll_position(position);
            let state = fab.state();
            let direction = if position > previous {
                Some(ScrollDirection::Down)
            } else if position < previous {
                Some(ScrollDirection::Up)
            } else {
                None
            };
            prop_assert_eq!(state.scroll_direction, direction);

            let hidden_by_direction =
                hide_on_scroll_down && direction == Some(ScrollDirection::Down);
            prop_assert_eq!(state.is_visible, position >= threshold && !hidden_by_direction);
            previous = position;
        }
    }
}

#[test]
fn fab_snapshot_serializes_camel_case() {
    let fab = FloatingActionButton::default();
    insta::assert_json_snapshot!(fab.state(), @r#"
    {
      "isVisible": false,
      "scrollPosition": 0.0,
      "scrollDirection": null,
      "threshold": 100.0,
      "hideOnScrollDown": true,
      "isExpanded": false
    }
    "#);
}
