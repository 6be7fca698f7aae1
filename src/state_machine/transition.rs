//! Pure state transition function
//!
//! Every (stage, event) pair has exactly one outcome, so there is no error
//! path here. Order events are honored from any stage.

use super::order::{OrderSummary, PaymentMethod};
use super::{replies, ConvContext, Effect, Event, Order, Stage};

const GREETINGS: [&str; 2] = ["hi", "hello"];

/// Result of a state transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    pub new_stage: Stage,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(stage: Stage) -> Self {
        Self {
            new_stage: stage,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Pure transition function
///
/// Given the same stage, context and event it always produces the same
/// result and performs no I/O.
pub fn transition(stage: Stage, context: &ConvContext, event: &Event) -> TransitionResult {
    let to = context.sender_id.as_str();

    match (stage, event) {
        // Orders short-circuit the text flow from every stage
        (_, Event::Order(order)) => order_placed(context, order),

        (Stage::Initial, Event::Text { body }) if is_greeting(body) => {
            TransitionResult::new(Stage::AwaitingAddress)
                .with_effect(Effect::send(replies::location_request(to)))
        }

        (Stage::Initial, Event::Text { .. }) => {
            TransitionResult::new(Stage::Initial).with_effect(Effect::send(replies::welcome(to)))
        }

        // Any text counts as the address; it is neither validated nor kept
        (Stage::AwaitingAddress | Stage::AddressProvided, Event::Text { .. }) => {
            TransitionResult::new(Stage::CatalogShown).with_effect(Effect::send(replies::catalog(
                to,
                context.catalog_thumbnail_product_id.as_deref(),
            )))
        }

        (Stage::CatalogShown, Event::Text { .. }) => TransitionResult::new(Stage::CatalogShown)
            .with_effect(Effect::send(replies::catalog_reminder(to))),

        (Stage::OrderPlaced, Event::Text { body }) => match PaymentMethod::detect(body) {
            Some(method) => TransitionResult::new(Stage::Initial).with_effect(Effect::ConfirmOrder {
                recipient_id: to.to_string(),
                method,
            }),
            None => TransitionResult::new(Stage::OrderPlaced)
                .with_effect(Effect::send(replies::payment_reminder(to))),
        },
    }
}

fn order_placed(context: &ConvContext, order: &Order) -> TransitionResult {
    let to = context.sender_id.as_str();
    let summary = OrderSummary::compute(order, &context.fallback_currency);

    TransitionResult::new(Stage::OrderPlaced)
        .with_effect(Effect::send(replies::order_summary(to, &summary)))
        .with_effect(Effect::send_after(
            context.payment_prompt_delay,
            replies::payment_options(to),
        ))
}

/// Case-insensitive substring match, so "Hi there" and "this" both count
fn is_greeting(body: &str) -> bool {
    let lowered = body.to_lowercase();
    GREETINGS.iter().any(|greeting| lowered.contains(greeting))
}
