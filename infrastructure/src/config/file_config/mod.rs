//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod agents;
mod backends;
mod logging;
mod output;
mod workflow;

pub use agents::FileAgentsConfig;
pub use backends::{FileBackendConfig, PromptMode};
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use workflow::FileWorkflowConfig;

use crate::backends::builtin_presets;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("workflow.max_iterations must be at least 1")]
    ZeroMaxIterations,

    #[error("workflow.context_char_limit cannot be 0")]
    ZeroContextLimit,

    #[error("workflow.require_tests_pass is set but workflow.test_command is empty")]
    MissingTestCommand,

    #[error("backends.{backend}.command cannot be empty")]
    EmptyCommand { backend: String },

    #[error("backends.{backend}.timeout_seconds cannot be 0")]
    ZeroTimeout { backend: String },

    #[error("agents.{role} refers to unknown backend '{backend}'")]
    UnknownAgentBackend { role: &'static str, backend: String },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Convergence and Memory Bank settings
    pub workflow: FileWorkflowConfig,
    /// Backend assignment per role
    pub agents: FileAgentsConfig,
    /// Process backends by name
    pub backends: BTreeMap<String, FileBackendConfig>,
    /// Output settings
    pub output: FileOutputConfig,
    /// Transcript and diagnostic log files
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning every problem found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.workflow.max_iterations == 0 {
            errors.push(ConfigValidationError::ZeroMaxIterations);
        }
        if self.workflow.context_char_limit == 0 {
            errors.push(ConfigValidationError::ZeroContextLimit);
        }
        if self.workflow.require_tests_pass
            && self
                .workflow
                .test_command
                .as_deref()
                .is_none_or(|c| c.trim().is_empty())
        {
            errors.push(ConfigValidationError::MissingTestCommand);
        }

        for (name, backend) in &self.backends {
            if backend.command.trim().is_empty() {
                errors.push(ConfigValidationError::EmptyCommand {
                    backend: name.clone(),
                });
            }
            if backend.timeout_seconds == 0 {
                errors.push(ConfigValidationError::ZeroTimeout {
                    backend: name.clone(),
                });
            }
        }

        let known = |name: &str| {
            self.backends.contains_key(name)
                || builtin_presets().iter().any(|(preset, _)| *preset == name)
        };
        for (role, backend) in [
            ("architect", self.agents.architect.as_str()),
            ("executor", self.agents.executor.as_str()),
            ("critic", self.agents.critic_backend()),
        ] {
            if !known(backend) {
                errors.push(ConfigValidationError::UnknownAgentBackend {
                    role,
                    backend: backend.to_string(),
                });
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moa_domain::OutputFormat;
    use std::path::PathBuf;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[workflow]
max_iterations = 3
require_tests_pass = true
test_command = "cargo test"
context_char_limit = 20000
memory_dir = ".moa"

[agents]
architect = "claude"
executor = "local"
critic = "gemini"

[backends.local]
command = "ollama"
args = ["run", "qwen"]

[output]
format = "full"
color = false

[logging]
conversation_log = "logs/run.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.workflow.max_iterations, 3);
        assert!(config.workflow.require_tests_pass);
        assert_eq!(config.workflow.test_command.as_deref(), Some("cargo test"));
        assert!(config.workflow.require_critic_pass);
        assert_eq!(config.workflow.memory_dir, PathBuf::from(".moa"));
        assert_eq!(config.agents.executor, "local");
        assert_eq!(config.agents.critic_backend(), "gemini");
        assert_eq!(config.output.format, Some(OutputFormat::Full));
        assert!(!config.output.color);
        assert_eq!(
            config.logging.conversation_log,
            Some(PathBuf::from("logs/run.jsonl"))
        );
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[workflow]
max_iterations = 8
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.workflow.max_iterations, 8);
        // Defaults should apply
        assert_eq!(config.workflow.context_char_limit, 50_000);
        assert_eq!(config.agents, FileAgentsConfig::default());
        assert!(config.backends.is_empty());
        assert!(config.output.color);
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.workflow.max_iterations, 5);
        assert_eq!(config.workflow.memory_dir, PathBuf::from(".orchestrator"));
        assert_eq!(config.agents.critic_backend(), "gemini");
        assert!(config.logging.conversation_log.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_collects_every_problem() {
        let mut config = FileConfig::default();
        config.workflow.max_iterations = 0;
        config.workflow.require_tests_pass = true;
        config.agents.executor = "nowhere".to_string();
        config.backends.insert(
            "broken".to_string(),
            FileBackendConfig {
                timeout_seconds: 0,
                ..Default::default()
            },
        );

        let errors = config.validate();
        assert!(errors.contains(&ConfigValidationError::ZeroMaxIterations));
        assert!(errors.contains(&ConfigValidationError::MissingTestCommand));
        assert!(errors.contains(&ConfigValidationError::EmptyCommand {
            backend: "broken".to_string()
        }));
        assert!(errors.contains(&ConfigValidationError::ZeroTimeout {
            backend: "broken".to_string()
        }));
        assert!(errors.contains(&ConfigValidationError::UnknownAgentBackend {
            role: "executor",
            backend: "nowhere".to_string()
        }));
        assert_eq!(errors.len(), 5);
    }
}
