//! WhatsApp Cloud API gateway implementation

use super::{GatewayError, MessageGateway, OutboundMessage, SendReceipt};
use crate::config::GatewayConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Sends messages through the Graph API `/{phone_number_id}/messages` endpoint
pub struct CloudApiClient {
    client: Client,
    access_token: String,
    endpoint: String,
}

impl CloudApiClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            access_token: config.access_token.clone(),
            endpoint: messages_endpoint(config),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify_error(status: reqwest::StatusCode, body: &str) -> GatewayError {
        // Graph API errors look like {"error":{"message":"...","code":131030}}
        let detail = serde_json::from_str::<GraphErrorEnvelope>(body)
            .ok()
            .map_or_else(|| body.to_string(), |envelope| envelope.error.message);

        let message = match status.as_u16() {
            401 | 403 => format!("Authentication failed: {detail}"),
            429 => format!("Rate limited: {detail}"),
            400..=499 => format!("Invalid request: {detail}"),
            500..=599 => format!("Server error: {detail}"),
            _ => format!("HTTP {status}: {detail}"),
        };
        GatewayError::from_status(status.as_u16(), message)
    }
}

fn messages_endpoint(config: &GatewayConfig) -> String {
    format!(
        "{}/{}/{}/messages",
        config.base_url.trim_end_matches('/'),
        config.api_version.trim_matches('/'),
        config.phone_number_id
    )
}

#[async_trait]
impl MessageGateway for CloudApiClient {
    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&message.to_wire())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    GatewayError::network(format!("Connection failed: {e}"))
                } else {
                    GatewayError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::classify_error(status, &body));
        }

        // A 2xx is a successful send even if the body is not what we expect
        let message_id = serde_json::from_str::<SendResponse>(&body)
            .ok()
            .and_then(|resp| resp.messages.into_iter().next())
            .map(|m| m.id);

        Ok(SendReceipt { message_id })
    }
}

// Graph API response types

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GraphErrorEnvelope {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}
