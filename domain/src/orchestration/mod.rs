//! Workflow orchestration domain
//!
//! Phases of the plan → implement → review loop and the status snapshot an
//! orchestrator reports.

pub mod phase;
pub mod status;

pub use phase::WorkflowPhase;
pub use status::WorkflowStatus;
