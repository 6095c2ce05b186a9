//! Agent-to-backend assignment from TOML (`[agents]` section)

use serde::{Deserialize, Serialize};

/// Which backend plays each role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentsConfig {
    pub architect: String,
    pub executor: String,
    /// Defaults to the architect's backend
    pub critic: Option<String>,
}

impl Default for FileAgentsConfig {
    fn default() -> Self {
        Self {
            architect: "gemini".to_string(),
            executor: "claude".to_string(),
            critic: None,
        }
    }
}

impl FileAgentsConfig {
    /// Backend name for the critic, falling back to the architect's
    pub fn critic_backend(&self) -> &str {
        self.critic.as_deref().unwrap_or(&self.architect)
    }
}
