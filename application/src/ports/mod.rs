//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod backend;
pub mod context_store;
pub mod conversation_logger;
pub mod progress;
pub mod test_gate;
