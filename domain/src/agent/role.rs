//! Semantic agent roles

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Semantic role of an agent.
///
/// Roles label turns in the conversation log and select a default system
/// prompt; they do not change how an agent is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Planner,
    Architect,
    Executor,
    Critic,
    Researcher,
    Tester,
    Debugger,
    Verifier,
    Documenter,
    #[default]
    Custom,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Planner => "planner",
            AgentRole::Architect => "architect",
            AgentRole::Executor => "executor",
            AgentRole::Critic => "critic",
            AgentRole::Researcher => "researcher",
            AgentRole::Tester => "tester",
            AgentRole::Debugger => "debugger",
            AgentRole::Verifier => "verifier",
            AgentRole::Documenter => "documenter",
            AgentRole::Custom => "custom",
        }
    }

    /// All roles, in declaration order
    pub fn all() -> &'static [AgentRole] {
        &[
            AgentRole::Planner,
            AgentRole::Architect,
            AgentRole::Executor,
            AgentRole::Critic,
            AgentRole::Researcher,
            AgentRole::Tester,
            AgentRole::Debugger,
            AgentRole::Verifier,
            AgentRole::Documenter,
            AgentRole::Custom,
        ]
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentRole {
    type Err = DomainError;

    /// Accepts the canonical names plus the common aliases
    /// `implementer` (executor) and `reviewer` (critic).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planner" => Ok(AgentRole::Planner),
            "architect" => Ok(AgentRole::Architect),
            "executor" | "implementer" => Ok(AgentRole::Executor),
            "critic" | "reviewer" => Ok(AgentRole::Critic),
            "researcher" => Ok(AgentRole::Researcher),
            "tester" => Ok(AgentRole::Tester),
            "debugger" => Ok(AgentRole::Debugger),
            "verifier" => Ok(AgentRole::Verifier),
            "documenter" => Ok(AgentRole::Documenter),
            "custom" => Ok(AgentRole::Custom),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}
