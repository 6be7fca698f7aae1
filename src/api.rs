//! HTTP API: Cloud API webhook ingress

mod handlers;
mod signature;
mod types;
mod webhook;

pub use handlers::create_router;

use crate::config::WebhookConfig;
use crate::runtime::ConversationEngine;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConversationEngine>,
    pub webhook: Arc<WebhookConfig>,
}

impl AppState {
    pub fn new(engine: Arc<ConversationEngine>, webhook: WebhookConfig) -> Self {
        Self {
            engine,
            webhook: Arc::new(webhook),
        }
    }
}
