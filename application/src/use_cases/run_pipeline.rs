//! Run pipeline use case
//!
//! A linear hand-off workflow: named agents run one after another, each
//! seeing the conversation so far. No review loop, no Memory Bank.

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

#[derive(Error, Debug)]
pub enum RunPipelineError {
    #[error("Invalid pipeline: {0}")]
    InvalidInput(#[from] DomainError),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),
}

/// One hand-off: which agent runs, and what it is asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStep {
    pub agent: String,
    pub task: String,
}

impl PipelineStep {
    pub fn new(agent: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            task: task.into(),
        }
    }
}

/// A validated pipeline, ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    goal: String,
    steps: Vec<PipelineStep>,
    handoff_template: String,
}

impl Pipeline {
    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn handoff_template(&self) -> &str {
        &self.handoff_template
    }

    /// Design, then implement, then review
    pub fn design_implement_review(task: &str) -> Self {
        Self {
            goal: task.to_string(),
            steps: vec![
                PipelineStep::new("architect", format!("Design the architecture for: {task}")),
                PipelineStep::new("executor", "Implement the designed solution"),
                PipelineStep::new(
                    "critic",
                    "Review the implementation for quality and best practices",
                ),
            ],
            handoff_template: WorkflowPromptTemplate::default_handoff_template().to_string(),
        }
    }

    /// Research, then design, then implement
    pub fn research_design_implement(task: &str) -> Self {
        Self {
            goal: task.to_string(),
            steps: vec![
                PipelineStep::new(
                    "researcher",
                    format!("Research best practices and patterns for: {task}"),
                ),
                PipelineStep::new("architect", "Design a solution based on the research"),
                PipelineStep::new("executor", "Implement the designed solution"),
            ],
            handoff_template: WorkflowPromptTemplate::default_handoff_template().to_string(),
        }
    }

    /// Diagnose, fix, then verify
    pub fn debug_fix_test(issue: &str) -> Self {
        Self {
            goal: format!("Fix: {issue}"),
            steps: vec![
                PipelineStep::new("debugger", format!("Diagnose the issue: {issue}")),
                PipelineStep::new("executor", "Fix the identified problem"),
                PipelineStep::new("tester", "Verify the fix works correctly"),
            ],
            handoff_template: WorkflowPromptTemplate::default_handoff_template().to_string(),
        }
    }
}

/// Fluent builder for a [`Pipeline`]
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    goal: String,
    steps: Vec<PipelineStep>,
    handoff_template: String,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            goal: String::new(),
            steps: Vec::new(),
            handoff_template: WorkflowPromptTemplate::default_handoff_template().to_string(),
        }
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    pub fn then(mut self, agent: impl Into<String>, task: impl Into<String>) -> Self {
        self.steps.push(PipelineStep::new(agent, task));
        self
    }

    pub fn with_handoff_template(mut self, template: impl Into<String>) -> Self {
        self.handoff_template = template.into();
        self
    }

    /// Check that a goal and at least one step were given.
    pub fn build(self) -> Result<Pipeline, DomainError> {
        if self.goal.trim().is_empty() {
            return Err(DomainError::EmptyGoal);
        }
        if self.steps.is_empty() {
            return Err(DomainError::NoSteps);
        }
        Ok(Pipeline {
            goal: self.goal,
            steps: self.steps,
            handoff_template: self.handoff_template,
        })
    }
}

/// Use case for running a linear pipeline over named agents
pub struct RunPipelineUseCase {
    agents: HashMap<String, Agent>,
    context_turns: usize,
    logger: Arc<dyn ConversationLogger>,
}

impl RunPipelineUseCase {
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

    pub fn agent_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.agents.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, pipeline: &Pipeline) -> Result<Conversation, RunPipelineError> {
        self.execute_with_progress(pipeline, &NoProgress).await
    }

    /// Run every step in order; the first failed step ends the pipeline.
    pub async fn execute_with_progress(
        &self,
        pipeline: &Pipeline,
        progress: &dyn WorkflowProgressNotifier,
    ) -> Result<Conversation, RunPipelineError> {
        // Resolve every agent up front so a typo fails before any backend call
        let agents = pipeline
            .steps
            .iter()
            .map(|step| {
                self.agents
                    .get(&step.agent)
                    .ok_or_else(|| RunPipelineError::UnknownAgent(step.agent.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut conversation = Conversation::new(&pipeline.goal);
        info!(
            conversation = conversation.id(),
            steps = pipeline.steps.len(),
            "Starting pipeline"
        );
        self.logger.log(ConversationEvent::new(
            "workflow_started",
            json!({
                "conversation_id": conversation.id(),
                "goal": pipeline.goal,
                "steps": pipeline.steps.iter().map(|s| s.agent.as_str()).collect::<Vec<_>>(),
            }),
        ));

        let mut status = ConversationStatus::Completed;
        for (index, (step, agent)) in pipeline.steps.iter().zip(agents).enumerate() {
            let (task, context) = if index == 0 {
                (step.task.clone(), None)
            } else {
                (
                    WorkflowPromptTemplate::render_handoff(&pipeline.handoff_template, &step.task),
                    Some(conversation.context(self.context_turns)),
                )
            };

            progress.on_step_start(index + 1, agent.name());
            info!(step = index + 1, agent = agent.name(), "Pipeline step started");
            let invocation = agent.invoke_timed(&task, context.as_deref()).await;
            let success = invocation.response.is_success();

            let mut turn = ConversationTurn::from_response(
                agent.name(),
                agent.role(),
                &task,
                &invocation.response,
                invocation.elapsed,
            );
            turn.metadata.insert("step".into(), (index + 1).into());
            self.logger.log(ConversationEvent::new(
                "turn_recorded",
                json!({
                    "conversation_id": conversation.id(),
                    "step": index + 1,
                    "agent": agent.name(),
                    "role": agent.role().as_str(),
                    "backend": turn.backend,
                    "success": success,
                    "error": turn.error,
                    "execution_time": invocation.elapsed.as_secs_f64(),
                }),
            ));
            conversation.add_turn(turn);
            progress.on_step_complete(index + 1, agent.name(), success);

            if !success {
                warn!(
                    step = index + 1,
                    agent = agent.name(),
                    error = invocation.response.error().unwrap_or("unknown error"),
                    "Pipeline step failed"
                );
                conversation.set_failed_phase(format!("step {}: {}", index + 1, agent.name()));
                status = ConversationStatus::Failed;
                break;
            }
        }

        conversation.set_status(status);
        self.logger.log(ConversationEvent::new(
            "workflow_finished",
            json!({
                "conversation_id": conversation.id(),
                "status": status.as_str(),
                "turns": conversation.turn_count(),
            }),
        ));
        info!(
            conversation = conversation.id(),
            status = status.as_str(),
            "Pipeline finished"
        );

        Ok(conversation)
    }
}
