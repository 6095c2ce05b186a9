//! Orchestrator status snapshot

use super::phase::WorkflowPhase;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStatus {
    pub phase: WorkflowPhase,
    /// Conversations started by this orchestrator
    pub conversation_count: usize,
    pub memory_initialized: bool,
    pub working_dir: Option<PathBuf>,
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "phase={} conversations={} memory_initialized={}",
            self.phase.as_str(),
            self.conversation_count,
            self.memory_initialized
        )?;
        if let Some(dir) = &self.working_dir {
            write!(f, " working_dir={}", dir.display())?;
        }
        Ok(())
    }
}
