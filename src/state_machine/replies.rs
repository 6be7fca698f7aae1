//! Customer-facing message templates

use super::order::{OrderSummary, PaymentMethod};
use crate::messaging::{OutboundMessage, ReplyButton};

pub fn welcome(to: &str) -> OutboundMessage {
    OutboundMessage::text(
        to,
        "👋 Welcome to our store! Say \"hi\" whenever you are ready to place an order.",
    )
}

pub fn location_request(to: &str) -> OutboundMessage {
    OutboundMessage::location_request(
        to,
        "Great! Please share your delivery location so we can show what is available near you.",
    )
}

pub fn catalog(to: &str, thumbnail_product_id: Option<&str>) -> OutboundMessage {
    OutboundMessage::catalog(
        to,
        "Thanks! Browse our catalog and add items to your cart. Send the cart when you are done.",
        Some("Tap \"View catalog\" to start shopping".to_string()),
        thumbnail_product_id.map(String::from),
    )
}

pub fn catalog_reminder(to: &str) -> OutboundMessage {
    OutboundMessage::text(
        to,
        "Please select items from the catalog and send your cart to place an order.",
    )
}

pub fn order_summary(to: &str, summary: &OrderSummary) -> OutboundMessage {
    OutboundMessage::text(to, summary.render())
}

pub fn payment_options(to: &str) -> OutboundMessage {
    OutboundMessage::buttons(
        to,
        "How would you like to pay?",
        Some("Choose a payment method to confirm your order".to_string()),
        PaymentMethod::ALL
            .into_iter()
            .map(|method| ReplyButton::new(method.reply_id(), method.label()))
            .collect(),
    )
}

pub fn payment_reminder(to: &str) -> OutboundMessage {
    OutboundMessage::text(
        to,
        "Please select a payment method using the buttons above to confirm your order.",
    )
}

pub fn order_confirmation(to: &str, method: PaymentMethod, reference: &str) -> OutboundMessage {
    OutboundMessage::text(
        to,
        format!(
            "✅ Your order is confirmed!\nReference: {reference}\nPayment: {}\nThank you for shopping with us.",
            method.label()
        ),
    )
}
