//! Runtime for executing conversations
//!
//! Loads a sender's state, runs the pure transition, commits the new stage
//! and then performs the effects: immediate sends, delayed sends and order
//! confirmation.

mod executor;
mod scheduler;
mod store;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{ConversationEngine, EngineError, HandleOutcome, IgnoreReason, TransitionRecord};
pub use scheduler::DeferredSends;
pub use store::{InMemoryStateStore, SequentialReferences};
pub use traits::*;
