//! Inbound events that drive a conversation

use serde::{Deserialize, Serialize};

/// An event from one sender, already normalized by the webhook layer
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub sender_id: String,
    pub event: Event,
}

impl InboundEvent {
    pub fn text(sender_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            event: Event::Text { body: body.into() },
        }
    }

    pub fn order(sender_id: impl Into<String>, order: Order) -> Self {
        Self {
            sender_id: sender_id.into(),
            event: Event::Order(order),
        }
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Free text, or the reply id of a tapped button
    Text { body: String },
    /// Cart submitted from the catalog
    Order(Order),
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Text { .. } => "text",
            Event::Order(_) => "order",
        }
    }
}

/// A cart order as received from the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub catalog_id: Option<String>,
    /// Free-text note the customer attached to the cart
    pub note: Option<String>,
    /// Line items in arrival order
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub currency: String,
}

impl LineItem {
    pub fn new(
        product_id: impl Into<String>,
        quantity: u32,
        unit_price: f64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit_price,
            currency: currency.into(),
        }
    }

    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}
