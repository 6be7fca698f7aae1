//! Cloud API webhook payloads to conversation events

use super::types::OrderPayload;
use crate::state_machine::{InboundEvent, Order};
use serde_json::Value;
use thiserror::Error;

/// Why an inbound message could not become an event
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageError {
    #[error("message has no sender")]
    MissingSender,
    #[error("{kind} message has no usable body")]
    MissingBody { kind: &'static str },
    #[error("unsupported message type {0:?}")]
    Unsupported(String),
    #[error("malformed order: {0}")]
    InvalidOrder(String),
}

/// First message of the first change of the first entry
///
/// Status callbacks and other notifications carry no `messages` and yield
/// `None`.
pub fn first_message(payload: &Value) -> Option<&Value> {
    payload
        .get("entry")?
        .get(0)?
        .get("changes")?
        .get(0)?
        .get("value")?
        .get("messages")?
        .get(0)
}

/// Turn one Cloud API message object into an engine event
///
/// Replies to interactive prompts become plain text so the state machine
/// sees button ids and shared locations the same way as typed text.
pub fn normalize(message: &Value) -> Result<InboundEvent, MessageError> {
    let sender = message
        .get("from")
        .and_then(Value::as_str)
        .ok_or(MessageError::MissingSender)?;
    let kind = message.get("type").and_then(Value::as_str).unwrap_or_default();

    let (kind, body) = match kind {
        "text" => ("text", str_at(message, &["/text/body"])),
        "interactive" => (
            "interactive",
            str_at(
                message,
                &["/interactive/button_reply/id", "/interactive/list_reply/id"],
            ),
        ),
        "button" => ("button", str_at(message, &["/button/payload", "/button/text"])),
        "location" => ("location", location_text(message)),
        "order" => {
            let order = parse_order(message)?;
            return Ok(InboundEvent::order(sender, order));
        }
        other => return Err(MessageError::Unsupported(other.to_string())),
    };

    body.map(|body| InboundEvent::text(sender, body))
        .ok_or(MessageError::MissingBody { kind })
}

/// First string found at any of `pointers`
fn str_at(message: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .find_map(|pointer| message.pointer(pointer).and_then(Value::as_str))
        .map(str::to_string)
}

fn location_text(message: &Value) -> Option<String> {
    if let Some(text) = str_at(message, &["/location/address", "/location/name"]) {
        return Some(text);
    }
    let latitude = message.pointer("/location/latitude").and_then(Value::as_f64)?;
    let longitude = message.pointer("/location/longitude").and_then(Value::as_f64)?;
    Some(format!("{latitude},{longitude}"))
}

fn parse_order(message: &Value) -> Result<Order, MessageError> {
    let raw = message
        .get("order")
        .ok_or(MessageError::MissingBody { kind: "order" })?;
    let payload: OrderPayload = serde_json::from_value(raw.clone())
        .map_err(|e| MessageError::InvalidOrder(e.to_string()))?;
    Ok(payload.into())
}
