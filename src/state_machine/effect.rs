//! Effects produced by state transitions

use super::order::PaymentMethod;
use crate::messaging::OutboundMessage;
use std::time::Duration;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send a message now; the webhook response waits for it
    Send { message: OutboundMessage },

    /// Send a message after `delay` without holding up the webhook
    SendAfter {
        delay: Duration,
        message: OutboundMessage,
    },

    /// Issue an order reference and send the confirmation
    ConfirmOrder {
        recipient_id: String,
        method: PaymentMethod,
    },
}

impl Effect {
    pub fn send(message: OutboundMessage) -> Self {
        Effect::Send { message }
    }

    pub fn send_after(delay: Duration, message: OutboundMessage) -> Self {
        Effect::SendAfter { delay, message }
    }

    /// Whether the webhook handler waits on this effect
    #[cfg(test)]
    pub fn is_immediate(&self) -> bool {
        !matches!(self, Effect::SendAfter { .. })
    }
}
