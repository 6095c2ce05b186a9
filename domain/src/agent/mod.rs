//! Agent domain
//!
//! An agent binds a semantic role, a backend and a system prompt. The role
//! is organisational only; behaviour comes from the system prompt. This
//! module holds the pure parts: [`AgentRole`] and the parsed
//! [`AgentResponse`].

pub mod response;
pub mod role;

pub use response::AgentResponse;
pub use role::AgentRole;
