//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::order::OrderSummary;
use super::*;
use crate::messaging::MessageKind;
use proptest::prelude::*;
use std::time::Duration;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> ConvContext {
    ConvContext::new("111", "INR").with_payment_prompt_delay(Duration::from_millis(2000))
}

fn count_immediate(result: &TransitionResult) -> usize {
    result.effects.iter().filter(|e| e.is_immediate()).count()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_stage() -> impl Strategy<Value = Stage> {
    prop_oneof![
        Just(Stage::Initial),
        Just(Stage::AwaitingAddress),
        Just(Stage::AddressProvided),
        Just(Stage::CatalogShown),
        Just(Stage::OrderPlaced),
    ]
}

fn arb_line_item() -> impl Strategy<Value = LineItem> {
    (
        "[a-z0-9-]{1,12}",
        0u32..50,
        0u32..100_000,
        prop_oneof![Just("INR"), Just("USD"), Just("EUR")],
    )
        .prop_map(|(product_id, quantity, cents, currency)| {
            LineItem::new(product_id, quantity, f64::from(cents) / 100.0, currency)
        })
}

fn arb_order() -> impl Strategy<Value = Order> {
    (
        proptest::option::of("[a-zA-Z ]{0,30}"),
        proptest::collection::vec(arb_line_item(), 0..8),
    )
        .prop_map(|(note, items)| Order {
            catalog_id: None,
            note,
            items,
        })
}

/// Text that can never match a greeting or a payment id
fn arb_plain_text() -> impl Strategy<Value = String> {
    "[0-9 .,!?]{1,30}"
}

fn arb_greeting_text() -> impl Strategy<Value = String> {
    (
        "[a-z ]{0,10}",
        prop_oneof![Just("hi"), Just("HI"), Just("Hi"), Just("hello"), Just("HeLLo")],
        "[a-z ]{0,10}",
    )
        .prop_map(|(prefix, greeting, suffix)| format!("{prefix}{greeting}{suffix}"))
}

fn arb_payment_text() -> impl Strategy<Value = (String, PaymentMethod)> {
    (
        "[0-9 ]{0,10}",
        prop_oneof![
            Just(PaymentMethod::Upi),
            Just(PaymentMethod::Card),
            Just(PaymentMethod::CashOnDelivery)
        ],
        any::<bool>(),
        "[0-9 ]{0,10}",
    )
        .prop_map(|(prefix, method, upper, suffix)| {
            let id = if upper {
                method.reply_id().to_uppercase()
            } else {
                method.reply_id().to_string()
            };
            (format!("{prefix}{id}{suffix}"), method)
        })
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-zA-Z0-9_ ]{1,40}".prop_map(|body| Event::Text { body }),
        arb_order().prop_map(Event::Order),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// The transition function is deterministic
    #[test]
    fn prop_transition_is_pure(stage in arb_stage(), event in arb_event()) {
        let ctx = test_context();
        prop_assert_eq!(transition(stage, &ctx, &event), transition(stage, &ctx, &event));
    }

    /// A transition emits at most two effects and at most one deferred send
    #[test]
    fn prop_effect_count_bounded(stage in arb_stage(), event in arb_event()) {
        let result = transition(stage, &test_context(), &event);
        prop_assert!(!result.effects.is_empty());
        prop_assert!(result.effects.len() <= 2);
        let deferred = result.effects.len() - count_immediate(&result);
        prop_assert!(deferred <= 1);
    }

    /// Orders always land in OrderPlaced with summary now and prompt later
    #[test]
    fn prop_order_always_placed(stage in arb_stage(), order in arb_order()) {
        let result = transition(stage, &test_context(), &Event::Order(order));
        prop_assert_eq!(result.new_stage, Stage::OrderPlaced);
        prop_assert_eq!(result.effects.len(), 2);
        prop_assert!(
            matches!(&result.effects[0], Effect::Send { message } if message.kind() == MessageKind::Text),
            "first effect should be the immediate summary"
        );
        prop_assert!(
            matches!(
                &result.effects[1],
                Effect::SendAfter { delay, message }
                    if *delay == Duration::from_millis(2000) && message.kind() == MessageKind::Buttons
            ),
            "second effect should be the delayed payment prompt"
        );
    }

    /// Total is the sum of quantity x price, currency from the first line
    #[test]
    fn prop_total_is_sum_of_subtotals(order in arb_order()) {
        let summary = OrderSummary::compute(&order, "INR");
        let expected: f64 = order
            .items
            .iter()
            .map(|item| f64::from(item.quantity) * item.unit_price)
            .sum();
        prop_assert!((summary.total - expected).abs() < 1e-6);

        let expected_currency = order.items.first().map_or("INR", |item| item.currency.as_str());
        prop_assert_eq!(summary.currency.as_str(), expected_currency);
    }

    /// Summary lines keep arrival order
    #[test]
    fn prop_summary_preserves_order(order in arb_order()) {
        let summary = OrderSummary::compute(&order, "INR");
        let summary_ids: Vec<&str> = summary.lines.iter().map(|l| l.product_id.as_str()).collect();
        let order_ids: Vec<&str> = order.items.iter().map(|i| i.product_id.as_str()).collect();
        prop_assert_eq!(summary_ids, order_ids);
    }

    /// Greetings from Initial always ask for a location
    #[test]
    fn prop_greeting_requests_location(body in arb_greeting_text()) {
        let result = transition(Stage::Initial, &test_context(), &Event::Text { body });
        prop_assert_eq!(result.new_stage, Stage::AwaitingAddress);
        prop_assert_eq!(result.effects.len(), 1);
        prop_assert!(matches!(
            &result.effects[0],
            Effect::Send { message } if message.kind() == MessageKind::LocationRequest
        ), "effect should be the location request");
    }

    /// Non-greetings from Initial stay in Initial with one welcome
    #[test]
    fn prop_non_greeting_welcomes(body in arb_plain_text()) {
        let result = transition(Stage::Initial, &test_context(), &Event::Text { body });
        prop_assert_eq!(result.new_stage, Stage::Initial);
        prop_assert_eq!(result.effects.len(), 1);
    }

    /// Any payment id, any case, resets the cycle with a confirmation
    #[test]
    fn prop_payment_confirms((body, method) in arb_payment_text()) {
        let result = transition(Stage::OrderPlaced, &test_context(), &Event::Text { body });
        prop_assert_eq!(result.new_stage, Stage::Initial);
        prop_assert_eq!(
            result.effects,
            vec![Effect::ConfirmOrder { recipient_id: "111".to_string(), method }]
        );
    }

    /// Without a payment id the order stays open
    #[test]
    fn prop_no_payment_stays_placed(body in arb_plain_text()) {
        let result = transition(Stage::OrderPlaced, &test_context(), &Event::Text { body });
        prop_assert_eq!(result.new_stage, Stage::OrderPlaced);
    }

    /// Every message is addressed to the sender in context
    #[test]
    fn prop_replies_go_to_sender(stage in arb_stage(), event in arb_event()) {
        let result = transition(stage, &test_context(), &event);
        for effect in &result.effects {
            let recipient = match effect {
                Effect::Send { message } | Effect::SendAfter { message, .. } => &message.recipient_id,
                Effect::ConfirmOrder { recipient_id, .. } => recipient_id,
            };
            prop_assert_eq!(recipient.as_str(), "111");
        }
    }
}
