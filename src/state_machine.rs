//! Core ordering conversation state machine
//!
//! Pure transitions: a stage and an inbound event go in, the next stage and
//! the effects to execute come out. All I/O lives in the runtime.

mod effect;
pub mod event;
pub mod order;
pub mod replies;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{Event, InboundEvent, LineItem, Order};
pub use order::{OrderSummary, PaymentMethod};
pub use state::{ConvContext, ConversationState, Stage};
pub use transition::{transition, TransitionResult};
