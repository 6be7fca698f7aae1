//! Messaging gateway abstraction
//!
//! The conversation runtime only needs "send this message to this user";
//! the Cloud API client is one implementation of that contract.

mod cloud_api;
mod error;
mod types;

pub use cloud_api::CloudApiClient;
pub use error::{GatewayError, GatewayErrorKind};
pub use types::{MessageBody, MessageKind, OutboundMessage, ReplyButton};

use async_trait::async_trait;
use std::sync::Arc;

/// Acknowledgement of an accepted send
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReceipt {
    /// Provider message id (`wamid.…`), when the provider returned one
    pub message_id: Option<String>,
}

/// Delivers outbound messages to a messaging provider
#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, GatewayError>;
}

#[async_trait]
impl<T: MessageGateway + ?Sized> MessageGateway for Arc<T> {
    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, GatewayError> {
        (**self).send(message).await
    }
}

/// Logging wrapper for gateways
pub struct LoggingGateway {
    inner: Arc<dyn MessageGateway>,
}

impl LoggingGateway {
    pub fn new(inner: Arc<dyn MessageGateway>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl MessageGateway for LoggingGateway {
    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, GatewayError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(message).await;
        let duration = start.elapsed();

        match &result {
            Ok(receipt) => {
                tracing::info!(
                    recipient = %message.recipient_id,
                    kind = message.kind().as_str(),
                    duration_ms = %duration.as_millis(),
                    message_id = receipt.message_id.as_deref().unwrap_or("-"),
                    "Message sent"
                );
            }
            Err(e) => {
                tracing::error!(
                    recipient = %message.recipient_id,
                    kind = message.kind().as_str(),
                    duration_ms = %duration.as_millis(),
                    error_kind = e.kind.as_str(),
                    status = e.status,
                    error = %e.message,
                    "Message send failed"
                );
            }
        }

        result
    }
}
