//! Default in-process implementations of the runtime traits

use super::traits::{ReferenceGenerator, StateStore, StoreError};
use crate::state_machine::ConversationState;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Volatile state table; everything is lost on restart
#[derive(Default)]
pub struct InMemoryStateStore {
    states: RwLock<HashMap<String, ConversationState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn sender_count(&self) -> usize {
        self.states.read().await.len()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, sender_id: &str) -> Result<Option<ConversationState>, StoreError> {
        Ok(self.states.read().await.get(sender_id).cloned())
    }

    async fn set(&self, state: ConversationState) -> Result<(), StoreError> {
        self.states
            .write()
            .await
            .insert(state.sender_id.clone(), state);
        Ok(())
    }
}

/// `ORD-<utc timestamp>-<sequence>` references
///
/// The sequence alone guarantees uniqueness within the process; the
/// timestamp keeps references from different runs apart in practice.
#[derive(Default)]
pub struct SequentialReferences {
    sequence: AtomicU64,
}

impl SequentialReferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReferenceGenerator for SequentialReferences {
    fn next_reference(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("ORD-{}-{seq:04}", Utc::now().format("%Y%m%d%H%M%S"))
    }
}
