//! Conversation log
//!
//! A [`Conversation`] is the append-only audit trail of one workflow run.
//! Turns can be added but never removed, replaced or reordered; the only
//! sequencing guarantee is insertion order.

pub mod entities;

pub use entities::{Conversation, ConversationMetadata, ConversationStatus, ConversationTurn};
