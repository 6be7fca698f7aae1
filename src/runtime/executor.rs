//! Conversation engine: applies transitions and executes their effects

use super::scheduler::DeferredSends;
use super::store::SequentialReferences;
use super::traits::{ReferenceGenerator, StateStore, StoreError};
use crate::config::ConversationSettings;
use crate::messaging::{GatewayError, MessageGateway};
use crate::state_machine::{
    replies, transition, ConvContext, ConversationState, Effect, Event, InboundEvent, Stage,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The stage change is kept even though the send failed
    #[error("send failed after moving to {committed}: {source}")]
    Gateway {
        committed: Stage,
        source: GatewayError,
    },
}

/// Why an event was dropped without touching any state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    MissingSender,
    EmptyBody,
}

impl IgnoreReason {
    pub fn as_str(self) -> &'static str {
        match self {
            IgnoreReason::MissingSender => "missing sender id",
            IgnoreReason::EmptyBody => "empty message body",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    Ignored { reason: IgnoreReason },
    Transitioned(TransitionRecord),
}

/// What one committed transition did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRecord {
    pub sender_id: String,
    pub from: Stage,
    pub to: Stage,
    /// Transitions committed for this sender so far, this one included
    pub transitions: u64,
    /// Messages delivered before returning
    pub sent: usize,
    /// Messages left to the deferred scheduler
    pub scheduled: usize,
    /// Order reference issued by this transition
    pub reference: Option<String>,
}

/// Owns the conversation state table and drives every sender's machine
///
/// Events for one sender are applied one at a time; different senders run
/// concurrently.
pub struct ConversationEngine {
    store: Arc<dyn StateStore>,
    gateway: Arc<dyn MessageGateway>,
    references: Arc<dyn ReferenceGenerator>,
    settings: ConversationSettings,
    deferred: DeferredSends,
    /// Cancels the delayed payment prompt still owed to each sender
    pending_prompts: Mutex<HashMap<String, CancellationToken>>,
    sender_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ConversationEngine {
    pub fn new(
        store: Arc<dyn StateStore>,
        gateway: Arc<dyn MessageGateway>,
        settings: ConversationSettings,
    ) -> Self {
        Self {
            store,
            gateway,
            references: Arc::new(SequentialReferences::new()),
            settings,
            deferred: DeferredSends::new(),
            pending_prompts: Mutex::new(HashMap::new()),
            sender_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_references(mut self, references: Arc<dyn ReferenceGenerator>) -> Self {
        self.references = references;
        self
    }

    pub fn with_deferred(mut self, deferred: DeferredSends) -> Self {
        self.deferred = deferred;
        self
    }

    /// Apply one inbound event
    ///
    /// The new stage is stored before any message goes out, so a failed send
    /// leaves the conversation at the new stage.
    pub async fn handle(&self, inbound: InboundEvent) -> Result<HandleOutcome, EngineError> {
        let InboundEvent { sender_id, event } = inbound;

        if sender_id.trim().is_empty() {
            tracing::warn!(event = event.kind(), "Ignoring event without sender id");
            return Ok(HandleOutcome::Ignored {
                reason: IgnoreReason::MissingSender,
            });
        }
        if matches!(&event, Event::Text { body } if body.trim().is_empty()) {
            tracing::warn!(sender = %sender_id, "Ignoring text event with empty body");
            return Ok(HandleOutcome::Ignored {
                reason: IgnoreReason::EmptyBody,
            });
        }

        let lock = self.sender_lock(&sender_id).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.apply(&sender_id, &event).await
        };
        drop(lock);
        self.release_sender_lock(&sender_id).await;

        outcome.map(HandleOutcome::Transitioned)
    }

    async fn apply(&self, sender_id: &str, event: &Event) -> Result<TransitionRecord, EngineError> {
        let current = match self.store.get(sender_id).await? {
            Some(state) => state,
            None => {
                tracing::info!(sender = %sender_id, "New conversation");
                ConversationState::new(sender_id)
            }
        };

        let from = current.stage;
        let result = transition(from, &self.context_for(sender_id), event);
        let state = current.advance(result.new_stage);
        let transitions = state.transitions;
        self.store.set(state).await?;

        tracing::info!(
            sender = %sender_id,
            event = event.kind(),
            from = %from,
            to = %result.new_stage,
            transitions,
            "Conversation transition"
        );

        // A prompt scheduled for an earlier order is stale once the
        // conversation moves on or a new order replaces it
        if result.new_stage != Stage::OrderPlaced || matches!(event, Event::Order(_)) {
            self.cancel_pending_prompt(sender_id).await;
        }

        let mut record = TransitionRecord {
            sender_id: sender_id.to_string(),
            from,
            to: result.new_stage,
            transitions,
            sent: 0,
            scheduled: 0,
            reference: None,
        };

        // Effects run in order; the first failed send skips the rest
        for effect in result.effects {
            if let Err(source) = self.execute_effect(effect, &mut record).await {
                return Err(EngineError::Gateway {
                    committed: record.to,
                    source,
                });
            }
        }

        Ok(record)
    }

    async fn execute_effect(
        &self,
        effect: Effect,
        record: &mut TransitionRecord,
    ) -> Result<(), GatewayError> {
        match effect {
            Effect::Send { message } => {
                self.gateway.send(&message).await?;
                record.sent += 1;
            }

            Effect::SendAfter { delay, message } => {
                let cancel = self.deferred.child_token();
                if let Some(previous) = self
                    .pending_prompts
                    .lock()
                    .await
                    .insert(record.sender_id.clone(), cancel.clone())
                {
                    previous.cancel();
                }

                let gateway = Arc::clone(&self.gateway);
                self.deferred.schedule_with(delay, cancel, async move {
                    // Nobody is waiting on this send; log and move on
                    if let Err(e) = gateway.send(&message).await {
                        tracing::warn!(
                            recipient = %message.recipient_id,
                            error = %e,
                            "Deferred send failed"
                        );
                    }
                });
                record.scheduled += 1;
            }

            Effect::ConfirmOrder {
                recipient_id,
                method,
            } => {
                let reference = self.references.next_reference();
                tracing::info!(
                    sender = %recipient_id,
                    reference = %reference,
                    payment = method.reply_id(),
                    "Order confirmed"
                );
                record.reference = Some(reference.clone());
                let message = replies::order_confirmation(&recipient_id, method, &reference);
                self.gateway.send(&message).await?;
                record.sent += 1;
            }
        }
        Ok(())
    }

    async fn cancel_pending_prompt(&self, sender_id: &str) {
        let Some(token) = self.pending_prompts.lock().await.remove(sender_id) else {
            return;
        };
        if !token.is_cancelled() {
            tracing::debug!(sender = %sender_id, "Cancelling pending payment prompt");
            token.cancel();
        }
    }

    fn context_for(&self, sender_id: &str) -> ConvContext {
        ConvContext::new(sender_id, self.settings.fallback_currency.as_str())
            .with_payment_prompt_delay(self.settings.payment_prompt_delay)
            .with_catalog_thumbnail(self.settings.catalog_thumbnail_product_id.clone())
    }

    async fn sender_lock(&self, sender_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.sender_locks.lock().await;
        Arc::clone(locks.entry(sender_id.to_string()).or_default())
    }

    /// Forget the lock once no other task holds or waits on it
    async fn release_sender_lock(&self, sender_id: &str) {
        let mut locks = self.sender_locks.lock().await;
        if locks
            .get(sender_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(sender_id);
        }
    }

    /// Deferred sends not yet delivered
    pub fn pending_deferred(&self) -> usize {
        self.deferred.pending()
    }

    /// Drop deferred sends that have not fired and wait for in-flight ones
    pub async fn shutdown(&self) {
        let pending = self.pending_deferred();
        if pending > 0 {
            tracing::info!(pending, "Dropping deferred sends at shutdown");
        }
        self.deferred.shutdown().await;
    }

    #[cfg(test)]
    pub async fn drain_deferred(&self) {
        self.deferred.drain().await;
    }
}
