//! Workflow phases

use serde::{Deserialize, Serialize};

/// Phase of a MoA workflow
///
/// Per iteration the loop moves `Planning → Coding → Reviewing`, then either
/// stops in a terminal phase or goes through `Fixing` into the next
/// `Planning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowPhase {
    #[default]
    Planning,
    Coding,
    Reviewing,
    Fixing,
    Completed,
    Failed,
}

impl WorkflowPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowPhase::Planning => "planning",
            WorkflowPhase::Coding => "coding",
            WorkflowPhase::Reviewing => "reviewing",
            WorkflowPhase::Fixing => "fixing",
            WorkflowPhase::Completed => "completed",
            WorkflowPhase::Failed => "failed",
        }
    }

    /// Upper-case label written to the Memory Bank status block
    pub fn status_label(&self) -> &'static str {
        match self {
            WorkflowPhase::Planning => "PLANNING",
            WorkflowPhase::Coding => "CODING",
            WorkflowPhase::Reviewing => "REVIEWING",
            WorkflowPhase::Fixing => "FIX",
            WorkflowPhase::Completed => "COMPLETED",
            WorkflowPhase::Failed => "FAILED",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WorkflowPhase::Planning => "Planning",
            WorkflowPhase::Coding => "Coding",
            WorkflowPhase::Reviewing => "Reviewing",
            WorkflowPhase::Fixing => "Fixing",
            WorkflowPhase::Completed => "Completed",
            WorkflowPhase::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowPhase::Completed | WorkflowPhase::Failed)
    }
}

impl std::fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
