//! Progress notification port
//!
//! Defines the interface for reporting progress while a workflow runs.

use moa_domain::{StopReason, Verdict, WorkflowPhase};

/// Callback for progress updates during a workflow
///
/// Implementations live in the presentation layer.
pub trait WorkflowProgressNotifier: Send + Sync {
    /// Called at the top of each iteration
    fn on_iteration_start(&self, iteration: usize, max_iterations: usize);

    /// Called right before an agent is invoked for a phase
    fn on_phase_start(&self, phase: WorkflowPhase, agent: &str);

    /// Called when the phase's agent returned
    fn on_phase_complete(&self, phase: WorkflowPhase, agent: &str, success: bool);

    /// Called right before a pipeline or loop turn runs (`step` is 1-based)
    fn on_step_start(&self, _step: usize, _agent: &str) {}

    /// Called when a pipeline or loop turn returned
    fn on_step_complete(&self, _step: usize, _agent: &str, _success: bool) {}

    /// Called once the critic's verdict for an iteration is known
    fn on_verdict(&self, _iteration: usize, _verdict: Option<Verdict>) {}

    /// Called when the Memory Bank is compacted (or compaction is skipped)
    fn on_compaction(&self, _compacted: bool) {}

    /// Called once when the workflow stops
    fn on_finished(&self, _iterations: usize, _reason: StopReason) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl WorkflowProgressNotifier for NoProgress {
    fn on_iteration_start(&self, _iteration: usize, _max_iterations: usize) {}
    fn on_phase_start(&self, _phase: WorkflowPhase, _agent: &str) {}
    fn on_phase_complete(&self, _phase: WorkflowPhase, _agent: &str, _success: bool) {}
}
