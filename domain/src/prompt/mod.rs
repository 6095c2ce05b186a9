//! Prompt domain
//!
//! Role system prompts ([`RolePromptTemplate`]) and the per-phase task
//! prompts of the MoA workflow ([`WorkflowPromptTemplate`]).

pub mod agent;
pub mod template;

pub use agent::RolePromptTemplate;
pub use template::WorkflowPromptTemplate;
