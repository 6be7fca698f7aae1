//! Mock implementations for testing
//!
//! These mocks enable engine and API tests without real I/O.

use super::traits::{ReferenceGenerator, StateStore, StoreError};
use crate::messaging::{GatewayError, MessageGateway, OutboundMessage, SendReceipt};
use crate::state_machine::ConversationState;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock Gateway
// ============================================================================

/// Records delivered messages and fails on demand
#[derive(Default)]
pub struct MockGateway {
    failures: Mutex<VecDeque<GatewayError>>,
    /// Messages the gateway accepted, in send order
    pub sent: Mutex<Vec<OutboundMessage>>,
    /// Every send attempt, including failed ones
    pub attempts: Mutex<Vec<OutboundMessage>>,
    latency: Option<Duration>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every send (for concurrency tests)
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Fail the next send with `error`
    pub fn fail_next(&self, error: GatewayError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_bodies(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.body_text().to_string())
            .collect()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageGateway for MockGateway {
    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, GatewayError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.attempts.lock().unwrap().push(message.clone());
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(SendReceipt {
            message_id: Some(format!("wamid.mock{}", sent.len())),
        })
    }
}

// ============================================================================
// Failing Store
// ============================================================================

/// Store whose every operation fails
pub struct BrokenStore;

#[async_trait]
impl StateStore for BrokenStore {
    async fn get(&self, _sender_id: &str) -> Result<Option<ConversationState>, StoreError> {
        Err(StoreError("store offline".to_string()))
    }

    async fn set(&self, _state: ConversationState) -> Result<(), StoreError> {
        Err(StoreError("store offline".to_string()))
    }
}

// ============================================================================
// Deterministic References
// ============================================================================

/// `REF-1`, `REF-2`, …
#[derive(Default)]
pub struct CountingReferences {
    next: AtomicU64,
}

impl ReferenceGenerator for CountingReferences {
    fn next_reference(&self) -> String {
        format!("REF-{}", self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
