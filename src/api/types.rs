//! API request and response types

use crate::state_machine::{LineItem, Order};
use serde::{Deserialize, Serialize};

/// Subscription handshake parameters sent by Meta on `GET /webhook`
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Body of every `POST /webhook` response
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WebhookResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub name: &'static str,
    pub version: &'static str,
}

/// `order` object of an inbound cart submission
#[derive(Debug, Deserialize)]
pub struct OrderPayload {
    #[serde(default)]
    pub catalog_id: Option<String>,
    /// Free-text note the customer attached to the cart
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub product_items: Vec<ProductItem>,
}

#[derive(Debug, Deserialize)]
pub struct ProductItem {
    pub product_retailer_id: String,
    pub quantity: u32,
    pub item_price: f64,
    pub currency: String,
}

impl From<OrderPayload> for Order {
    fn from(payload: OrderPayload) -> Self {
        Order {
            catalog_id: payload.catalog_id,
            note: payload.text,
            items: payload
                .product_items
                .into_iter()
                .map(|item| {
                    LineItem::new(
                        item.product_retailer_id,
                        item.quantity,
                        item.item_price,
                        item.currency,
                    )
                })
                .collect(),
        }
    }
}
