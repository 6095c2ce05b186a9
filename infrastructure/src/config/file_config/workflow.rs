//! Workflow configuration from TOML (`[workflow]` section)

use moa_application::WorkflowConfig;
use moa_domain::{ConvergenceCriteria, DomainError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw workflow configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorkflowConfig {
    pub max_iterations: usize,
    pub require_critic_pass: bool,
    pub require_tests_pass: bool,
    /// Memory Bank size (chars) above which it is compacted
    pub context_char_limit: usize,
    pub memory_dir: PathBuf,
    /// Extra description written into the product context
    pub project_info: String,
    /// Shell command run after each review when `require_tests_pass` is set
    pub test_command: Option<String>,
}

impl Default for FileWorkflowConfig {
    fn default() -> Self {
        let defaults = WorkflowConfig::default();
        Self {
            max_iterations: defaults.criteria.max_iterations(),
            require_critic_pass: defaults.criteria.require_critic_pass(),
            require_tests_pass: defaults.criteria.require_tests_pass(),
            context_char_limit: defaults.criteria.context_char_limit(),
            memory_dir: defaults.memory_dir,
            project_info: defaults.project_info,
            test_command: None,
        }
    }
}

impl FileWorkflowConfig {
    /// Convert to the application's workflow parameters.
    pub fn to_workflow_config(&self) -> Result<WorkflowConfig, DomainError> {
        let criteria = ConvergenceCriteria::new(self.max_iterations)?
            .with_require_critic_pass(self.require_critic_pass)
            .with_require_tests_pass(self.require_tests_pass)
            .with_context_char_limit(self.context_char_limit);
        Ok(WorkflowConfig::new(criteria)
            .with_memory_dir(self.memory_dir.clone())
            .with_project_info(self.project_info.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_application_defaults() {
        let config = FileWorkflowConfig::default().to_workflow_config().unwrap();
        assert_eq!(config, WorkflowConfig::default());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let config = FileWorkflowConfig {
            max_iterations: 0,
            ..Default::default()
        };
        assert_eq!(
            config.to_workflow_config(),
            Err(DomainError::InvalidMaxIterations(0))
        );
    }
}
