//! Domain layer for moa-orchestrator
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Mixture of Agents
//!
//! A workflow runs specialised agents in a loop until a critic approves:
//!
//! - **Architect** designs, **Executor** implements, **Critic** reviews
//! - The critic's free-form review is reduced to a [`Verdict`]
//! - [`ConvergenceCriteria`] decide when the loop stops
//!
//! ## Memory Bank
//!
//! Three Markdown documents (product, active, patterns) carry project state
//! across iterations and sessions. See [`memory`].

pub mod agent;
pub mod backend;
pub mod config;
pub mod conversation;
pub mod convergence;
pub mod core;
pub mod memory;
pub mod orchestration;
pub mod prompt;
pub mod verdict;

// Re-export commonly used types
pub use agent::{AgentResponse, AgentRole};
pub use backend::{BackendOptions, BackendResult};
pub use config::OutputFormat;
pub use conversation::{Conversation, ConversationMetadata, ConversationStatus, ConversationTurn};
pub use convergence::{ConvergenceCriteria, StopReason};
pub use core::error::DomainError;
pub use memory::{MemorySection, MemoryTemplates};
pub use orchestration::{WorkflowPhase, WorkflowStatus};
pub use prompt::{RolePromptTemplate, WorkflowPromptTemplate};
pub use verdict::{Verdict, parse_verdict};
