//! Trait abstractions for runtime I/O
//!
//! These traits let the engine run against in-memory, durable or mock
//! implementations.

use crate::state_machine::ConversationState;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("state store error: {0}")]
pub struct StoreError(pub String);

/// Storage for per-sender conversation state
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Current state for `sender_id`, `None` for an unseen sender
    async fn get(&self, sender_id: &str) -> Result<Option<ConversationState>, StoreError>;

    /// Insert or replace the state for `state.sender_id`
    async fn set(&self, state: ConversationState) -> Result<(), StoreError>;
}

/// Source of order confirmation references
pub trait ReferenceGenerator: Send + Sync {
    /// Must never repeat within the lifetime of the generator
    fn next_reference(&self) -> String;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    async fn get(&self, sender_id: &str) -> Result<Option<ConversationState>, StoreError> {
        (**self).get(sender_id).await
    }

    async fn set(&self, state: ConversationState) -> Result<(), StoreError> {
        (**self).set(state).await
    }
}

impl<T: ReferenceGenerator + ?Sized> ReferenceGenerator for Arc<T> {
    fn next_reference(&self) -> String {
        (**self).next_reference()
    }
}
