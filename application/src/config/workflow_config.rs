//! Workflow parameters, use case loop control.
//!
//! [`WorkflowConfig`] is passed explicitly into
//! [`RunMoaWorkflowUseCase`](crate::use_cases::run_workflow::RunMoaWorkflowUseCase);
//! there is no global settings object.

use moa_domain::ConvergenceCriteria;
use moa_domain::conversation::entities::DEFAULT_CONTEXT_TURNS;
use moa_domain::prompt::template::EXCERPT_CHARS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default Memory Bank directory, relative to the working directory
pub const DEFAULT_MEMORY_DIR: &str = ".orchestrator";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub criteria: ConvergenceCriteria,
    /// Where the Memory Bank lives
    pub memory_dir: PathBuf,
    /// Directory agents and the test gate work in
    pub working_dir: Option<PathBuf>,
    /// Extra project description written into the product context
    pub project_info: String,
    /// Turns rendered into a pipeline step's context
    pub context_turns: usize,
    /// Characters kept per excerpt in the iteration summary
    pub excerpt_chars: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            criteria: ConvergenceCriteria::default(),
            memory_dir: PathBuf::from(DEFAULT_MEMORY_DIR),
            working_dir: None,
            project_info: String::new(),
            context_turns: DEFAULT_CONTEXT_TURNS,
            excerpt_chars: EXCERPT_CHARS,
        }
    }
}

impl WorkflowConfig {
    pub fn new(criteria: ConvergenceCriteria) -> Self {
        Self {
            criteria,
            ..Default::default()
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_memory_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.memory_dir = dir.into();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_project_info(mut self, info: impl Into<String>) -> Self {
        self.project_info = info.into();
        self
    }

    pub fn with_context_turns(mut self, turns: usize) -> Self {
        self.context_turns = turns;
        self
    }

    pub fn with_excerpt_chars(mut self, chars: usize) -> Self {
        self.excerpt_chars = chars;
        self
    }
}
