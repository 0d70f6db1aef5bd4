//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across arbitrary update streams.

use super::*;
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap()
}

fn update(kind: UpdateKind) -> Update {
    Update {
        update_id: 1,
        sender_id: 1,
        chat_id: 1,
        kind,
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_node() -> impl Strategy<Value = Option<NodeName>> {
    prop_oneof![
        Just(None),
        Just(Some(NodeName::Start)),
        Just(Some(NodeName::CreateTransaction)),
        Just(Some(NodeName::ListTransactions)),
        Just(Some(NodeName::ShowTransaction)),
    ]
}

fn arb_args() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[0-9]{1,4}",
        "[0-3][0-9]\\.[01][0-9]\\.20[0-9]{2}",
        "[a-zA-Z0-9 .-]{0,20}",
    ]
}

fn arb_update() -> impl Strategy<Value = Update> {
    let command = (
        prop_oneof![
            Just("start".to_string()),
            Just("create".to_string()),
            Just("list".to_string()),
            "[a-z]{1,8}",
        ],
        arb_args(),
    )
        .prop_map(|(name, args)| {
            update(UpdateKind::Command {
                message_id: 1,
                name,
                args,
            })
        });

    let callback = (
        prop_oneof![
            Just("list".to_string()),
            Just("show".to_string()),
            Just("edit".to_string()),
            Just("noop".to_string()),
        ],
        arb_args(),
    )
        .prop_map(|(token, args)| {
            update(UpdateKind::Callback {
                callback_id: "cb".to_string(),
                message_id: 2,
                data: format!("{token} {args}"),
            })
        });

    let text = arb_args().prop_map(|text| update(UpdateKind::Text { message_id: 3, text }));

    prop_oneof![command, callback, text]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Whatever the input, the state never names a node outside the graph
    #[test]
    fn prop_state_always_names_a_node(
        initial in arb_node(),
        updates in prop::collection::vec(arb_update(), 1..30),
    ) {
        let graph = StateGraph::build();
        let mut state = UserState { name: initial, ..UserState::default() };

        for update in updates {
            match graph.advance(&state, &update, test_now()) {
                Ok(next) => {
                    let name = next.name.expect("committed state has a name");
                    prop_assert!(graph.contains(name));
                    state = next;
                }
                Err(StateError::NoTransition | StateError::Validation(_)) => {}
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
        }
    }

    /// A committed transition into a node sets exactly what its renderer needs
    #[test]
    fn prop_destination_preconditions_hold(
        initial in arb_node(),
        update in arb_update(),
    ) {
        let graph = StateGraph::build();
        let state = UserState { name: initial, ..UserState::default() };

        if let Ok(next) = graph.advance(&state, &update, test_now()) {
            match next.node() {
                NodeName::ListTransactions => prop_assert!(next.date.is_some()),
                NodeName::ShowTransaction => prop_assert!(next.transaction_id.is_some()),
                NodeName::Start => {
                    prop_assert!(next.date.is_none());
                    prop_assert!(next.transaction_id.is_none());
                }
                NodeName::CreateTransaction => {}
            }
        }
    }

    /// Show callbacks carry the id through unchanged
    #[test]
    fn prop_show_callback_selects_id(id in any::<u64>()) {
        let graph = StateGraph::build();
        let state = UserState {
            name: Some(NodeName::ListTransactions),
            ..UserState::default()
        };
        let update = update(UpdateKind::Callback {
            callback_id: "cb".to_string(),
            message_id: 2,
            data: format!("show {id}"),
        });

        let next = graph.advance(&state, &update, test_now()).unwrap();
        prop_assert_eq!(next.transaction_id, Some(id));
        prop_assert_eq!(next.node(), NodeName::ShowTransaction);
    }
}
