//! Run loop use case
//!
//! Round-robin conversation: the first agent answers the initial prompt,
//! then agents take turns reviewing and continuing the last response until
//! a stop condition holds, the turn budget or the cycle budget is spent,
//! or a backend call fails.

use crate::config::WorkflowConfig;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::progress::{NoProgress, WorkflowProgressNotifier};
use crate::use_cases::agent::Agent;
use moa_domain::{
    Conversation, ConversationStatus, ConversationTurn, DomainError, WorkflowPromptTemplate,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Default cap on recorded turns
pub const DEFAULT_MAX_TURNS: usize = 20;

/// Predicate checked before every hand-off; `true` ends the loop
pub type StopCondition = dyn Fn(&Conversation) -> bool + Send + Sync;

#[derive(Error, Debug)]
pub enum RunLoopError {
    #[error("Invalid loop: {0}")]
    InvalidInput(#[from] DomainError),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),
}

/// Why a loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStop {
    /// The caller's stop condition held
    Condition,
    /// `max_turns` turns were recorded
    MaxTurns,
    /// Every agent had `max_iterations` full rounds
    MaxIterations,
    /// A backend call failed
    AgentFailed,
}

impl LoopStop {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopStop::Condition => "stop_condition",
            LoopStop::MaxTurns => "max_turns",
            LoopStop::MaxIterations => "max_iterations",
            LoopStop::AgentFailed => "agent_failed",
        }
    }
}

impl std::fmt::Display for LoopStop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated round-robin loop, ready to run
#[derive(Clone)]
pub struct AgentLoop {
    goal: String,
    agents: Vec<String>,
    initial_prompt: String,
    max_iterations: usize,
    max_turns: usize,
    stop_condition: Option<Arc<StopCondition>>,
}

impl AgentLoop {
    /// Check the goal, the agent list and both bounds.
    pub fn new(
        goal: impl Into<String>,
        agents: Vec<String>,
        initial_prompt: impl Into<String>,
        max_iterations: usize,
        max_turns: usize,
    ) -> Result<Self, DomainError> {
        let goal = goal.into();
        if goal.trim().is_empty() {
            return Err(DomainError::EmptyGoal);
        }
        if agents.is_empty() {
            return Err(DomainError::NoSteps);
        }
        if max_iterations == 0 {
            return Err(DomainError::InvalidMaxIterations(max_iterations));
        }
        if max_turns == 0 {
            return Err(DomainError::InvalidMaxTurns(max_turns));
        }
        Ok(Self {
            goal,
            agents,
            initial_prompt: initial_prompt.into(),
            max_iterations,
            max_turns,
            stop_condition: None,
        })
    }

    pub fn with_stop_condition(
        mut self,
        condition: impl Fn(&Conversation) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.stop_condition = Some(Arc::new(condition));
        self
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    fn should_stop(&self, conversation: &Conversation) -> bool {
        self.stop_condition
            .as_ref()
            .is_some_and(|condition| condition(conversation))
    }
}

impl std::fmt::Debug for AgentLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentLoop")
            .field("goal", &self.goal)
            .field("agents", &self.agents)
            .field("max_iterations", &self.max_iterations)
            .field("max_turns", &self.max_turns)
            .field("stop_condition", &self.stop_condition.is_some())
            .finish()
    }
}

/// Use case for running a round-robin loop over named agents
pub struct RunLoopUseCase {
    agents: HashMap<String, Agent>,
    context_turns: usize,
    logger: Arc<dyn ConversationLogger>,
}

impl RunLoopUseCase {
    pub fn new(config: &WorkflowConfig) -> Self {
        Self {
            agents: HashMap::new(),
            context_turns: config.context_turns,
            logger: Arc::new(NoConversationLogger),
        }
    }

    /// Register an agent under its own name
    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.agents.insert(agent.name().to_string(), agent);
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, agent_loop: &AgentLoop) -> Result<Conversation, RunLoopError> {
        self.execute_with_progress(agent_loop, &NoProgress).await
    }

    /// Run the loop to one of its stop causes.
    ///
    /// The stop cause is recorded under the `loop_stop` metadata key and the
    /// number of completed rounds under `rounds`.
    pub async fn execute_with_progress(
        &self,
        agent_loop: &AgentLoop,
        progress: &dyn WorkflowProgressNotifier,
    ) -> Result<Conversation, RunLoopError> {
        let agents = agent_loop
            .agents
            .iter()
            .map(|name| {
                self.agents
                    .get(name)
                    .ok_or_else(|| RunLoopError::UnknownAgent(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut conversation = Conversation::new(&agent_loop.goal);
        info!(
            conversation = conversation.id(),
            agents = agents.len(),
            max_iterations = agent_loop.max_iterations,
            max_turns = agent_loop.max_turns,
            "Starting loop"
        );
        self.logger.log(ConversationEvent::new(
            "workflow_started",
            json!({
                "conversation_id": conversation.id(),
                "goal": agent_loop.goal,
                "mode": "loop",
                "agents": agent_loop.agents,
                "max_iterations": agent_loop.max_iterations,
                "max_turns": agent_loop.max_turns,
            }),
        ));

        let mut stop = LoopStop::MaxIterations;
        let mut rounds = 0;
        let mut next_agent = 0;

        if !self
            .run_turn(&mut conversation, agents[0], &agent_loop.initial_prompt, false, progress)
            .await
        {
            stop = LoopStop::AgentFailed;
        } else {
            next_agent = 1 % agents.len();
            if next_agent == 0 {
                rounds = 1;
            }
        }

        while stop != LoopStop::AgentFailed && rounds < agent_loop.max_iterations {
            if agent_loop.should_stop(&conversation) {
                stop = LoopStop::Condition;
                break;
            }
            if conversation.turn_count() >= agent_loop.max_turns {
                stop = LoopStop::MaxTurns;
                break;
            }

            let task =
                WorkflowPromptTemplate::loop_handoff(conversation.last_response().unwrap_or(""));
            let agent = agents[next_agent];
            if !self
                .run_turn(&mut conversation, agent, &task, true, progress)
                .await
            {
                stop = LoopStop::AgentFailed;
                break;
            }

            next_agent = (next_agent + 1) % agents.len();
            if next_agent == 0 {
                rounds += 1;
            }
        }

        let status = if stop == LoopStop::AgentFailed {
            ConversationStatus::Failed
        } else {
            ConversationStatus::Completed
        };
        conversation.set_status(status);
        conversation.insert_metadata("loop_stop", stop.as_str());
        conversation.insert_metadata("rounds", rounds);

        self.logger.log(ConversationEvent::new(
            "workflow_finished",
            json!({
                "conversation_id": conversation.id(),
                "status": status.as_str(),
                "stop": stop.as_str(),
                "rounds": rounds,
                "turns": conversation.turn_count(),
            }),
        ));
        info!(
            conversation = conversation.id(),
            status = status.as_str(),
            stop = stop.as_str(),
            turns = conversation.turn_count(),
            "Loop finished"
        );

        Ok(conversation)
    }

    /// Invoke one agent and record its turn. Returns whether the call succeeded.
    async fn run_turn(
        &self,
        conversation: &mut Conversation,
        agent: &Agent,
        task: &str,
        with_context: bool,
        progress: &dyn WorkflowProgressNotifier,
    ) -> bool {
        let step = conversation.turn_count() + 1;
        let context = with_context.then(|| conversation.context(self.context_turns));

        progress.on_step_start(step, agent.name());
        let invocation = agent.invoke_timed(task, context.as_deref()).await;
        let success = invocation.response.is_success();

        let mut turn = ConversationTurn::from_response(
            agent.name(),
            agent.role(),
            task,
            &invocation.response,
            invocation.elapsed,
        );
        turn.metadata.insert("step".into(), step.into());
        self.logger.log(ConversationEvent::new(
            "turn_recorded",
            json!({
                "conversation_id": conversation.id(),
                "step": step,
                "agent": agent.name(),
                "role": agent.role().as_str(),
                "backend": turn.backend,
                "success": success,
                "error": turn.error,
                "execution_time": invocation.elapsed.as_secs_f64(),
            }),
        ));
        conversation.add_turn(turn);
        progress.on_step_complete(step, agent.name(), success);

        if !success {
            warn!(
                step,
                agent = agent.name(),
                error = invocation.response.error().unwrap_or("unknown error"),
                "Loop turn failed"
            );
            conversation.set_failed_phase(format!("turn {}: {}", step, agent.name()));
        }
        success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::agent::test_support::*;
    use moa_domain::AgentRole;

    fn use_case(
        architect: Vec<Scripted>,
        critic: Vec<Scripted>,
    ) -> (RunLoopUseCase, Arc<ScriptedBackend>, Arc<ScriptedBackend>) {
        let a = Arc::new(ScriptedBackend::new("a", architect));
        let c = Arc::new(ScriptedBackend::new("c", critic));
        let uc = RunLoopUseCase::new(&WorkflowConfig::default())
            .with_agent(Agent::for_role("architect", AgentRole::Architect, a.clone()))
            .with_agent(Agent::for_role("critic", AgentRole::Critic, c.clone()));
        (uc, a, c)
    }

    fn two_agents(max_iterations: usize, max_turns: usize) -> AgentLoop {
        AgentLoop::new(
            "a parser",
            vec!["architect".to_string(), "critic".to_string()],
            "Sketch a parser",
            max_iterations,
            max_turns,
        )
        .unwrap()
    }

    fn stop_of(conv: &Conversation) -> &str {
        conv.metadata().extra["loop_stop"].as_str().unwrap()
    }

    #[test]
    fn test_loop_validation() {
        let agents = vec!["architect".to_string()];
        assert_eq!(
            AgentLoop::new("g", agents.clone(), "p", 0, 5).unwrap_err(),
            DomainError::InvalidMaxIterations(0)
        );
        assert_eq!(
            AgentLoop::new("g", agents.clone(), "p", 3, 0).unwrap_err(),
            DomainError::InvalidMaxTurns(0)
        );
        assert_eq!(
            AgentLoop::new("g", vec![], "p", 3, 5).unwrap_err(),
            DomainError::NoSteps
        );
        assert_eq!(
            AgentLoop::new("  ", agents, "p", 3, 5).unwrap_err(),
            DomainError::EmptyGoal
        );
    }

    #[tokio::test]
    async fn test_loop_runs_full_rounds_then_stops() {
        let (uc, a, c) = use_case(
            vec![text("draft 1"), text("draft 2")],
            vec![text("review 1"), text("review 2")],
        );

        let conv = uc.execute(&two_agents(2, 20)).await.unwrap();

        assert_eq!(conv.status(), ConversationStatus::Completed);
        assert_eq!(stop_of(&conv), "max_iterations");
        assert_eq!(conv.metadata().extra["rounds"], 2);
        assert_eq!(conv.turn_count(), 4);
        assert_eq!(a.calls(), 2);
        assert_eq!(c.calls(), 2);

        // the opening turn has no context; hand-offs carry the last response
        assert!(!a.prompt(0).contains("Context:"));
        assert!(a.prompt(0).ends_with("Task:\nSketch a parser"));
        assert!(c.prompt(0).contains("Context:\nGoal: a parser"));
        assert!(c.prompt(0).ends_with("Task:\nReview and continue: draft 1..."));
        assert!(a.prompt(1).ends_with("Task:\nReview and continue: review 1..."));
        assert_eq!(conv.turns()[3].agent_name, "critic");
    }

    #[tokio::test]
    async fn test_loop_respects_turn_budget() {
        let (uc, a, c) = use_case(vec![text("x"); 5], vec![text("y"); 5]);

        let conv = uc.execute(&two_agents(10, 3)).await.unwrap();

        assert_eq!(conv.status(), ConversationStatus::Completed);
        assert_eq!(stop_of(&conv), "max_turns");
        assert_eq!(conv.turn_count(), 3);
        assert_eq!(a.calls() + c.calls(), 3);
    }

    #[tokio::test]
    async fn test_loop_stop_condition_is_checked_before_each_handoff() {
        let (uc, _a, c) = use_case(
            vec![text("draft"), text("final answer DONE")],
            vec![text("needs work"), text("unused")],
        );
        let agent_loop = two_agents(10, 20).with_stop_condition(|conv: &Conversation| {
            conv.last_response().is_some_and(|r| r.contains("DONE"))
        });

        let conv = uc.execute(&agent_loop).await.unwrap();

        assert_eq!(conv.status(), ConversationStatus::Completed);
        assert_eq!(stop_of(&conv), "stop_condition");
        assert_eq!(conv.turn_count(), 3);
        assert_eq!(c.calls(), 1);
        assert_eq!(conv.metadata().extra["rounds"], 1);
    }

    #[tokio::test]
    async fn test_loop_stops_on_failed_turn() {
        let (uc, a, _c) = use_case(
            vec![text("draft"), text("unused")],
            vec![error("exit status 1")],
        );

        let conv = uc.execute(&two_agents(5, 20)).await.unwrap();

        assert_eq!(conv.status(), ConversationStatus::Failed);
        assert_eq!(stop_of(&conv), "agent_failed");
        assert_eq!(conv.turn_count(), 2);
        assert_eq!(a.calls(), 1);
        assert_eq!(conv.metadata().failed_phase.as_deref(), Some("turn 2: critic"));
    }

    #[tokio::test]
    async fn test_failed_opening_turn_ends_the_loop() {
        let (uc, _a, c) = use_case(vec![error("not found")], vec![text("unused")]);

        let conv = uc.execute(&two_agents(5, 20)).await.unwrap();

        assert_eq!(conv.status(), ConversationStatus::Failed);
        assert_eq!(stop_of(&conv), "agent_failed");
        assert_eq!(conv.turn_count(), 1);
        assert_eq!(c.calls(), 0);
        assert_eq!(conv.metadata().extra["rounds"], 0);
    }

    #[tokio::test]
    async fn test_single_agent_loop_counts_each_turn_as_a_round() {
        let (uc, a, _c) = use_case(vec![text("v1"), text("v2"), text("v3")], vec![]);
        let agent_loop =
            AgentLoop::new("g", vec!["architect".to_string()], "start", 3, 20).unwrap();

        let conv = uc.execute(&agent_loop).await.unwrap();

        assert_eq!(stop_of(&conv), "max_iterations");
        assert_eq!(a.calls(), 3);
        assert!(a.prompt(2).ends_with("Task:\nReview and continue: v2..."));
    }

    #[tokio::test]
    async fn test_unknown_loop_agent_fails_before_any_call() {
        let (uc, a, _c) = use_case(vec![text("x")], vec![]);
        let agent_loop = AgentLoop::new(
            "g",
            vec!["architect".to_string(), "nobody".to_string()],
            "p",
            1,
            5,
        )
        .unwrap();

        let err = uc.execute(&agent_loop).await.unwrap_err();
        assert!(matches!(err, RunLoopError::UnknownAgent(name) if name == "nobody"));
        assert_eq!(a.calls(), 0);
    }

    #[tokio::test]
    async fn test_loop_reports_step_progress() {
        let (uc, _a, _c) = use_case(vec![text("d")], vec![text("r")]);
        let progress = RecordingProgress::default();

        uc.execute_with_progress(&two_agents(1, 20), &progress)
            .await
            .unwrap();

        assert_eq!(
            progress.events(),
            vec![
                "step 1 architect",
                "step 1 architect done true",
                "step 2 critic",
                "step 2 critic done true",
            ]
        );
    }
}
