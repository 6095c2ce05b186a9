//! Run MoA workflow use case
//!
//! Drives the plan → implement → review loop over three agents until the
//! convergence criteria say stop, recording every agent call as a turn.

use crate::config::WorkflowConfig;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::progress::{NoProgress, WorkflowProgressNotifier};
use crate::ports::test_gate::{AlwaysPass, TestGate};
use crate::use_cases::agent::Agent;
use crate::use_cases::memory_bank::{CompactionOutcome, MemoryBank, MemoryBankError};
use moa_domain::core::string::one_line_preview;
use moa_domain::{
    AgentResponse, AgentRole, Conversation, ConversationTurn, DomainError, StopReason,
    WorkflowPhase, WorkflowPromptTemplate, WorkflowStatus,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that stop a workflow before it can produce a conversation
///
/// Backend failures are not errors: they end the run with a failed
/// conversation and reason `backend_error`.
#[derive(Error, Debug)]
pub enum RunWorkflowError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] DomainError),

    #[error("Memory Bank error: {0}")]
    MemoryBank(#[from] MemoryBankError),
}

/// Use case for running a Mixture-of-Agents workflow
///
/// Holds one Memory Bank; running two workflows against the same Memory
/// Bank at once is not supported.
pub struct RunMoaWorkflowUseCase {
    architect: Agent,
    executor: Agent,
    critic: Agent,
    memory: MemoryBank,
    config: WorkflowConfig,
    logger: Arc<dyn ConversationLogger>,
    test_gate: Arc<dyn TestGate>,
    phase: Mutex<WorkflowPhase>,
    conversations: AtomicUsize,
}

impl RunMoaWorkflowUseCase {
    /// The critic defaults to the architect's backend and prompt, relabelled
    /// with role Critic.
    pub fn new(architect: Agent, executor: Agent, memory: MemoryBank, config: WorkflowConfig) -> Self {
        let critic = architect.relabel(format!("{}-critic", architect.name()), AgentRole::Critic);
        Self {
            architect,
            executor,
            critic,
            memory,
            config,
            logger: Arc::new(NoConversationLogger),
            test_gate: Arc::new(AlwaysPass),
            phase: Mutex::new(WorkflowPhase::Planning),
            conversations: AtomicUsize::new(0),
        }
    }

    pub fn with_critic(mut self, critic: Agent) -> Self {
        self.critic = critic;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_test_gate(mut self, gate: Arc<dyn TestGate>) -> Self {
        self.test_gate = gate;
        self
    }

    pub fn architect(&self) -> &Agent {
        &self.architect
    }

    pub fn executor(&self) -> &Agent {
        &self.executor
    }

    pub fn critic(&self) -> &Agent {
        &self.critic
    }

    pub fn memory_bank(&self) -> &MemoryBank {
        &self.memory
    }

    /// Snapshot of the orchestrator's current state
    pub fn status(&self) -> WorkflowStatus {
        WorkflowStatus {
            phase: self.current_phase(),
            conversation_count: self.conversations.load(Ordering::Relaxed),
            memory_initialized: self.memory.exists(),
            working_dir: self.config.working_dir.clone(),
        }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, goal: &str) -> Result<Conversation, RunWorkflowError> {
        self.execute_with_progress(goal, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        goal: &str,
        progress: &dyn WorkflowProgressNotifier,
    ) -> Result<Conversation, RunWorkflowError> {
        if goal.trim().is_empty() {
            return Err(DomainError::EmptyGoal.into());
        }

        let criteria = self.config.criteria;
        let mut conversation = Conversation::new(goal);
        self.conversations.fetch_add(1, Ordering::Relaxed);
        self.set_phase(WorkflowPhase::Planning);

        info!(
            conversation = conversation.id(),
            architect = self.architect.backend().name(),
            executor = self.executor.backend().name(),
            critic = self.critic.backend().name(),
            max_iterations = criteria.max_iterations(),
            "Starting MoA workflow"
        );
        self.logger.log(ConversationEvent::new(
            "workflow_started",
            json!({
                "conversation_id": conversation.id(),
                "goal": goal,
                "architect": self.architect.backend().name(),
                "executor": self.executor.backend().name(),
                "critic": self.critic.backend().name(),
                "max_iterations": criteria.max_iterations(),
            }),
        ));

        self.memory.initialize(goal, &self.config.project_info)?;

        let mut iteration = 0;
        let reason = loop {
            iteration += 1;
            progress.on_iteration_start(iteration, criteria.max_iterations());

            let context = self
                .prepare_context(&conversation, iteration, progress)
                .await?;

            // Phase 1: PLANNING
            let plan = self
                .run_phase(
                    &mut conversation,
                    iteration,
                    WorkflowPhase::Planning,
                    &self.architect,
                    &WorkflowPromptTemplate::design_task(goal),
                    &context,
                    progress,
                )
                .await;
            if !plan.is_success() {
                break abort(&mut conversation, WorkflowPhase::Planning);
            }

            // Phase 2: CODING
            let implementation = self
                .run_phase(
                    &mut conversation,
                    iteration,
                    WorkflowPhase::Coding,
                    &self.executor,
                    WorkflowPromptTemplate::implement_task(),
                    plan.content(),
                    progress,
                )
                .await;
            if !implementation.is_success() {
                break abort(&mut conversation, WorkflowPhase::Coding);
            }

            // Phase 3: REVIEWING
            let review = self
                .run_phase(
                    &mut conversation,
                    iteration,
                    WorkflowPhase::Reviewing,
                    &self.critic,
                    WorkflowPromptTemplate::review_task(),
                    implementation.content(),
                    progress,
                )
                .await;
            if !review.is_success() {
                break abort(&mut conversation, WorkflowPhase::Reviewing);
            }

            let verdict = review.verdict();
            progress.on_verdict(iteration, verdict);

            self.memory.update_active_context(
                &WorkflowPromptTemplate::iteration_summary_with_excerpt(
                    iteration,
                    verdict,
                    plan.content(),
                    implementation.content(),
                    review.content(),
                    self.config.excerpt_chars,
                ),
            )?;

            // Phase 4: convergence
            let tests_passed = if criteria.require_tests_pass() {
                self.test_gate
                    .run(self.config.working_dir.as_deref())
                    .await
            } else {
                true
            };
            let (stop, reason) = criteria.should_stop(iteration, verdict, tests_passed);
            debug!(iteration, verdict = ?verdict, tests_passed, %reason, "Convergence check");
            if stop {
                break reason;
            }

            // Phase 5: FIX
            let fix = self
                .run_phase(
                    &mut conversation,
                    iteration,
                    WorkflowPhase::Fixing,
                    &self.executor,
                    &WorkflowPromptTemplate::fix_task(review.content()),
                    implementation.content(),
                    progress,
                )
                .await;
            if !fix.is_success() {
                break abort(&mut conversation, WorkflowPhase::Fixing);
            }
        };

        conversation.finish(iteration, reason);
        self.set_phase(if reason == StopReason::Success {
            WorkflowPhase::Completed
        } else {
            WorkflowPhase::Failed
        });
        progress.on_finished(iteration, reason);

        info!(
            conversation = conversation.id(),
            iterations = iteration,
            %reason,
            turns = conversation.turn_count(),
            "MoA workflow finished"
        );
        self.logger.log(ConversationEvent::new(
            "workflow_finished",
            json!({
                "conversation_id": conversation.id(),
                "status": conversation.status().as_str(),
                "reason": reason.as_str(),
                "iterations": iteration,
                "turns": conversation.turn_count(),
                "failed_phase": conversation.metadata().failed_phase,
            }),
        ));

        Ok(conversation)
    }

    /// Read the Memory Bank for the next PLANNING phase, compacting it
    /// first when it has grown past the limit.
    async fn prepare_context(
        &self,
        conversation: &Conversation,
        iteration: usize,
        progress: &dyn WorkflowProgressNotifier,
    ) -> Result<String, RunWorkflowError> {
        let limit = self.config.criteria.context_char_limit();
        let chars = self.memory.read_full_context()?.chars().count();

        if chars > limit {
            info!(iteration, chars, limit, "Context over limit, compacting");
            let outcome = self
                .memory
                .compact(self.architect.backend().as_ref(), self.architect.options())
                .await?;
            progress.on_compaction(outcome.is_compacted());

            let payload = match &outcome {
                CompactionOutcome::Compacted {
                    before_chars,
                    after_chars,
                } => json!({
                    "conversation_id": conversation.id(),
                    "iteration": iteration,
                    "compacted": true,
                    "before_chars": before_chars,
                    "after_chars": after_chars,
                }),
                CompactionOutcome::Skipped { reason } => json!({
                    "conversation_id": conversation.id(),
                    "iteration": iteration,
                    "compacted": false,
                    "reason": reason,
                }),
            };
            self.logger
                .log(ConversationEvent::new("context_compacted", payload));
        }

        Ok(self.memory.read_context(limit)?)
    }

    /// Invoke `agent` for one phase and record the turn.
    #[allow(clippy::too_many_arguments)]
    async fn run_phase(
        &self,
        conversation: &mut Conversation,
        iteration: usize,
        phase: WorkflowPhase,
        agent: &Agent,
        task: &str,
        context: &str,
        progress: &dyn WorkflowProgressNotifier,
    ) -> AgentResponse {
        self.set_phase(phase);
        progress.on_phase_start(phase, agent.name());
        info!(iteration, phase = phase.as_str(), agent = agent.name(), "Phase started");

        let invocation = agent.invoke_timed(task, Some(context)).await;
        let response = invocation.response;

        let mut turn = ConversationTurn::from_response(
            agent.name(),
            agent.role(),
            task,
            &response,
            invocation.elapsed,
        );
        turn.metadata.insert("iteration".into(), iteration.into());
        turn.metadata.insert("phase".into(), phase.as_str().into());

        self.logger.log(ConversationEvent::new(
            "turn_recorded",
            json!({
                "conversation_id": conversation.id(),
                "iteration": iteration,
                "phase": phase.as_str(),
                "agent": agent.name(),
                "role": agent.role().as_str(),
                "backend": turn.backend,
                "success": turn.success,
                "verdict": response.verdict().map(|v| v.as_str()),
                "error": turn.error,
                "execution_time": invocation.elapsed.as_secs_f64(),
                "response_chars": turn.response.chars().count(),
            }),
        ));
        conversation.add_turn(turn);

        if response.is_success() {
            debug!(
                iteration,
                phase = phase.as_str(),
                agent = agent.name(),
                preview = %one_line_preview(response.content(), 80),
                "Phase complete"
            );
        } else {
            warn!(
                iteration,
                phase = phase.as_str(),
                agent = agent.name(),
                error = response.error().unwrap_or("unknown error"),
                "Backend call failed"
            );
        }
        progress.on_phase_complete(phase, agent.name(), response.is_success());

        response
    }

    fn set_phase(&self, phase: WorkflowPhase) {
        if let Ok(mut current) = self.phase.lock() {
            *current = phase;
        }
    }

    fn current_phase(&self) -> WorkflowPhase {
        self.phase.lock().map(|p| *p).unwrap_or_default()
    }
}

fn abort(conversation: &mut Conversation, phase: WorkflowPhase) -> StopReason {
    conversation.set_failed_phase(phase.as_str());
    StopReason::BackendError
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::agent::test_support::*;
    use async_trait::async_trait;
    use moa_domain::{ConversationStatus, ConvergenceCriteria};
    use std::path::Path;

    struct Harness {
        architect: Arc<ScriptedBackend>,
        executor: Arc<ScriptedBackend>,
        critic: Arc<ScriptedBackend>,
        use_case: RunMoaWorkflowUseCase,
    }

    fn harness(
        architect: Vec<Scripted>,
        executor: Vec<Scripted>,
        critic: Vec<Scripted>,
        config: WorkflowConfig,
    ) -> Harness {
        let architect_backend = Arc::new(ScriptedBackend::new("arch-backend", architect));
        let executor_backend = Arc::new(ScriptedBackend::new("exec-backend", executor));
        let critic_backend = Arc::new(ScriptedBackend::new("critic-backend", critic));

        let use_case = RunMoaWorkflowUseCase::new(
            Agent::for_role("architect", AgentRole::Architect, architect_backend.clone()),
            Agent::for_role("executor", AgentRole::Executor, executor_backend.clone()),
            MemoryBank::in_memory(),
            config,
        )
        .with_critic(Agent::for_role(
            "critic",
            AgentRole::Critic,
            critic_backend.clone(),
        ));

        Harness {
            architect: architect_backend,
            executor: executor_backend,
            critic: critic_backend,
            use_case,
        }
    }

    fn config(max_iterations: usize) -> WorkflowConfig {
        WorkflowConfig::new(ConvergenceCriteria::new(max_iterations).unwrap())
    }

    /// Logger that keeps event types in memory
    #[derive(Default)]
    struct RecordingLogger {
        events: std::sync::Mutex<Vec<&'static str>>,
    }

    impl ConversationLogger for RecordingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    /// Gate returning scripted outcomes
    struct ScriptedGate {
        outcomes: std::sync::Mutex<std::collections::VecDeque<bool>>,
    }

    #[async_trait]
    impl TestGate for ScriptedGate {
        async fn run(&self, _working_dir: Option<&Path>) -> bool {
            self.outcomes.lock().unwrap().pop_front().unwrap_or(false)
        }
    }

    #[tokio::test]
    async fn test_pass_on_second_review_completes_in_two_iterations() {
        let h = harness(
            vec![text("plan 1"), text("plan 2")],
            vec![text("impl 1"), text("fix 1"), text("impl 2")],
            vec![text("Looks mostly fine."), text("All good.\nVERDICT: PASS")],
            config(3),
        );

        let conv = h.use_case.execute("Build a CLI").await.unwrap();

        assert_eq!(conv.status(), ConversationStatus::Completed);
        assert_eq!(conv.metadata().iterations, Some(2));
        assert_eq!(conv.metadata().reason, Some(StopReason::Success));
        assert_eq!(conv.turn_count(), 7);

        let roles: Vec<_> = conv.turns().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![
                AgentRole::Architect,
                AgentRole::Executor,
                AgentRole::Critic,
                AgentRole::Executor,
                AgentRole::Architect,
                AgentRole::Executor,
                AgentRole::Critic,
            ]
        );
        assert_eq!(conv.turns()[0].prompt, "Design solution for: Build a CLI");
        assert_eq!(conv.turns()[1].prompt, "Implement this design");
        assert_eq!(
            conv.turns()[3].prompt,
            "Fix based on this feedback: Looks mostly fine."
        );

        assert_eq!(h.architect.calls(), 2);
        assert_eq!(h.executor.calls(), 3);
        assert_eq!(h.critic.calls(), 2);

        // executor sees the plan, critic sees the implementation
        assert!(h.executor.prompt(0).contains("Context:\nplan 1"));
        assert!(h.critic.prompt(0).contains("Context:\nimpl 1"));
        assert!(h.executor.prompt(1).contains("Context:\nimpl 1"));
    }

    #[tokio::test]
    async fn test_always_fail_stops_at_max_iterations() {
        let h = harness(
            vec![text("plan 1"), text("plan 2")],
            vec![text("impl 1"), text("fix 1"), text("impl 2")],
            vec![text("VERDICT: FAIL"), text("VERDICT: FAIL")],
            config(2),
        );

        let conv = h.use_case.execute("goal").await.unwrap();

        assert_eq!(conv.status(), ConversationStatus::Failed);
        assert_eq!(conv.metadata().iterations, Some(2));
        assert_eq!(
            conv.metadata().reason,
            Some(StopReason::MaxIterationsReached)
        );
        // no FIX after the final review
        assert_eq!(conv.turn_count(), 7);
        assert_eq!(conv.last_response(), Some("VERDICT: FAIL"));
        assert_eq!(h.use_case.status().phase, WorkflowPhase::Failed);
    }

    #[tokio::test]
    async fn test_memory_bank_carries_iteration_summary_into_next_plan() {
        let h = harness(
            vec![text("plan 1"), text("plan 2")],
            vec![text("impl 1"), text("fix 1"), text("impl 2")],
            vec![text("VERDICT: FAIL"), text("VERDICT: PASS")],
            config(3),
        );

        h.use_case.execute("goal").await.unwrap();

        let second_plan = h.architect.prompt(1);
        assert!(second_plan.contains("=== ACTIVE CONTEXT ==="));
        assert!(second_plan.contains("- Status: ITERATION 1"));
        assert!(second_plan.contains("- Verdict: FAIL"));

        let active = h.use_case.memory_bank().read_active_context().unwrap();
        assert!(active.contains("- Status: ITERATION 2"));
        assert!(active.contains("Task complete!"));
    }

    #[tokio::test]
    async fn test_compacts_once_before_second_planning() {
        let goal = "Build a CLI";
        let probe = MemoryBank::in_memory();
        probe.initialize(goal, "").unwrap();
        let initial_chars = probe.read_full_context().unwrap().chars().count();

        let criteria = ConvergenceCriteria::new(3)
            .unwrap()
            .with_context_char_limit(initial_chars + 100);
        let long_plan = "p".repeat(600);
        let h = harness(
            vec![text(&long_plan), text("short summary"), text("plan 2")],
            vec![text("impl 1"), text("fix 1"), text("impl 2")],
            vec![text("VERDICT: FAIL"), text("VERDICT: PASS")],
            WorkflowConfig::new(criteria),
        );

        let conv = h.use_case.execute(goal).await.unwrap();
        assert_eq!(conv.status(), ConversationStatus::Completed);

        // design, compaction, design
        assert_eq!(h.architect.calls(), 3);
        assert!(h.architect.prompt(0).contains("Task:\nDesign solution for"));
        assert!(h.architect.prompt(1).starts_with("Summarize this context"));
        assert!(h.architect.prompt(2).contains("short summary"));

        // compaction is not a turn
        assert_eq!(conv.turn_count(), 7);
    }

    #[tokio::test]
    async fn test_failed_compaction_keeps_running() {
        let goal = "g";
        let probe = MemoryBank::in_memory();
        probe.initialize(goal, "").unwrap();
        let initial_chars = probe.read_full_context().unwrap().chars().count();

        let criteria = ConvergenceCriteria::new(2)
            .unwrap()
            .with_context_char_limit(initial_chars + 100);
        let h = harness(
            vec![text(&"p".repeat(600)), error("rate limited"), text("plan 2")],
            vec![text("impl 1"), text("fix 1"), text("impl 2")],
            vec![text("VERDICT: FAIL"), text("VERDICT: PASS")],
            WorkflowConfig::new(criteria),
        );

        let conv = h.use_case.execute(goal).await.unwrap();
        assert_eq!(conv.metadata().iterations, Some(2));
        assert!(
            h.architect
                .prompt(2)
                .contains("Context:\n[WARNING: Context exceeds")
        );
    }

    #[tokio::test]
    async fn test_backend_failure_stops_with_backend_error() {
        let h = harness(
            vec![text("plan 1")],
            vec![error("Timeout after 300s")],
            vec![text("VERDICT: PASS")],
            config(3),
        );

        let conv = h.use_case.execute("goal").await.unwrap();

        assert_eq!(conv.status(), ConversationStatus::Failed);
        assert_eq!(conv.metadata().reason, Some(StopReason::BackendError));
        assert_eq!(conv.metadata().failed_phase.as_deref(), Some("coding"));
        assert_eq!(conv.metadata().iterations, Some(1));

        // failed turn is recorded, nothing after it
        assert_eq!(conv.turn_count(), 2);
        let failed = &conv.turns()[1];
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("Timeout after 300s"));
        assert_eq!(h.critic.calls(), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_during_fix() {
        let h = harness(
            vec![text("plan 1")],
            vec![text("impl 1"), error("crashed")],
            vec![text("VERDICT: FAIL")],
            config(3),
        );

        let conv = h.use_case.execute("goal").await.unwrap();
        assert_eq!(conv.metadata().reason, Some(StopReason::BackendError));
        assert_eq!(conv.metadata().failed_phase.as_deref(), Some("fixing"));
        assert_eq!(conv.turn_count(), 4);
        assert_eq!(h.architect.calls(), 1);
    }

    #[tokio::test]
    async fn test_require_tests_pass_consults_gate() {
        let criteria = ConvergenceCriteria::new(3)
            .unwrap()
            .with_require_tests_pass(true);
        let gate = Arc::new(ScriptedGate {
            outcomes: std::sync::Mutex::new(vec![false, true].into()),
        });
        let h = harness(
            vec![text("plan 1"), text("plan 2")],
            vec![text("impl 1"), text("fix 1"), text("impl 2")],
            vec![text("VERDICT: PASS"), text("VERDICT: PASS")],
            WorkflowConfig::new(criteria),
        );
        let use_case = h.use_case.with_test_gate(gate);

        let conv = use_case.execute("goal").await.unwrap();
        assert_eq!(conv.status(), ConversationStatus::Completed);
        assert_eq!(conv.metadata().iterations, Some(2));
    }

    #[tokio::test]
    async fn test_default_critic_reuses_architect_backend() {
        let architect = Arc::new(ScriptedBackend::new(
            "arch",
            vec![text("plan"), text("VERDICT: PASS")],
        ));
        let executor = Arc::new(ScriptedBackend::new("exec", vec![text("impl")]));
        let use_case = RunMoaWorkflowUseCase::new(
            Agent::for_role("architect", AgentRole::Architect, architect.clone()),
            Agent::for_role("executor", AgentRole::Executor, executor),
            MemoryBank::in_memory(),
            config(3),
        );

        assert_eq!(use_case.critic().role(), AgentRole::Critic);
        let conv = use_case.execute("goal").await.unwrap();
        assert_eq!(conv.status(), ConversationStatus::Completed);
        assert_eq!(architect.calls(), 2);
        assert_eq!(conv.turns()[2].role, AgentRole::Critic);
        assert_eq!(conv.turns()[2].backend, "arch");
    }

    #[tokio::test]
    async fn test_empty_goal_rejected() {
        let h = harness(vec![], vec![], vec![], config(1));
        let err = h.use_case.execute("   ").await.unwrap_err();
        assert!(matches!(
            err,
            RunWorkflowError::InvalidInput(DomainError::EmptyGoal)
        ));
        assert_eq!(h.use_case.status().conversation_count, 0);
    }

    #[tokio::test]
    async fn test_status_and_logged_events() {
        let logger = Arc::new(RecordingLogger::default());
        let h = harness(
            vec![text("plan")],
            vec![text("impl")],
            vec![text("VERDICT: PASS")],
            config(3),
        );
        let use_case = h.use_case.with_conversation_logger(logger.clone());

        let before = use_case.status();
        assert_eq!(before.conversation_count, 0);
        assert!(!before.memory_initialized);

        use_case.execute("goal").await.unwrap();

        let after = use_case.status();
        assert_eq!(after.phase, WorkflowPhase::Completed);
        assert_eq!(after.conversation_count, 1);
        assert!(after.memory_initialized);

        let events = logger.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "workflow_started",
                "turn_recorded",
                "turn_recorded",
                "turn_recorded",
                "workflow_finished",
            ]
        );
    }
}
