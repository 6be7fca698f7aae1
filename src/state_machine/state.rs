//! Conversation state types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Where a customer is in the ordering conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Nothing in progress; greetings start a new order
    #[default]
    Initial,

    /// Location request sent, waiting for the delivery address
    AwaitingAddress,

    /// Address received but catalog not yet shown
    #[allow(dead_code)] // Never entered by transitions; handled if found in a store
    AddressProvided,

    /// Catalog sent, waiting for an order from the cart
    CatalogShown,

    /// Order received, waiting for a payment method
    OrderPlaced,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Initial => "initial",
            Stage::AwaitingAddress => "awaiting_address",
            Stage::AddressProvided => "address_provided",
            Stage::CatalogShown => "catalog_shown",
            Stage::OrderPlaced => "order_placed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded conversation state for one sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub sender_id: String,
    pub stage: Stage,
    /// Number of transitions committed for this sender
    pub transitions: u64,
}

impl ConversationState {
    /// Fresh state for a sender we have not seen before
    pub fn new(sender_id: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            stage: Stage::Initial,
            transitions: 0,
        }
    }

    /// Commit a transition to `stage`
    #[must_use]
    pub fn advance(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self.transitions += 1;
        self
    }
}

/// Context handed to the transition function for a single event
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub sender_id: String,
    /// Currency code used when an order has no line items
    pub fallback_currency: String,
    /// Delay between the order summary and the payment prompt
    pub payment_prompt_delay: Duration,
    /// Product shown as the catalog message thumbnail
    pub catalog_thumbnail_product_id: Option<String>,
}

impl ConvContext {
    pub fn new(sender_id: impl Into<String>, fallback_currency: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            fallback_currency: fallback_currency.into(),
            payment_prompt_delay: Duration::from_secs(2),
            catalog_thumbnail_product_id: None,
        }
    }

    pub fn with_payment_prompt_delay(mut self, delay: Duration) -> Self {
        self.payment_prompt_delay = delay;
        self
    }

    pub fn with_catalog_thumbnail(mut self, product_id: Option<String>) -> Self {
        self.catalog_thumbnail_product_id = product_id;
        self
    }
}
