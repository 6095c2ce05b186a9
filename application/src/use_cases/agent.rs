//! Agent
//!
//! Binds a role, a backend and a system prompt, and turns backend output
//! into an [`AgentResponse`].

use crate::ports::backend::Backend;
use moa_domain::{AgentResponse, AgentRole, BackendOptions, RolePromptTemplate};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// A role + backend + system prompt binding
#[derive(Clone)]
pub struct Agent {
    name: String,
    role: AgentRole,
    backend: Arc<dyn Backend>,
    system_prompt: String,
    options: BackendOptions,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("backend", &self.backend.name())
            .finish_non_exhaustive()
    }
}

/// Response plus wall-clock time of one invocation
#[derive(Debug, Clone)]
pub struct Invocation {
    pub prompt: String,
    pub response: AgentResponse,
    pub elapsed: Duration,
}

impl Agent {
    /// Agent with an explicit system prompt
    pub fn new(
        name: impl Into<String>,
        role: AgentRole,
        backend: Arc<dyn Backend>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role,
            backend,
            system_prompt: system_prompt.into(),
            options: BackendOptions::default(),
        }
    }

    /// Agent using the role's default system prompt
    pub fn for_role(name: impl Into<String>, role: AgentRole, backend: Arc<dyn Backend>) -> Self {
        Self::new(name, role, backend, RolePromptTemplate::system_prompt(role))
    }

    pub fn with_options(mut self, options: BackendOptions) -> Self {
        self.options = options;
        self
    }

    /// Copy of this agent running on another backend
    pub fn with_backend(&self, backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            ..self.clone()
        }
    }

    /// Copy of this agent with another system prompt
    pub fn with_prompt(&self, system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            ..self.clone()
        }
    }

    /// Copy of this agent relabelled with another role and name
    pub fn relabel(&self, name: impl Into<String>, role: AgentRole) -> Self {
        Self {
            name: name.into(),
            role,
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn options(&self) -> &BackendOptions {
        &self.options
    }

    /// Full prompt sent to the backend.
    ///
    /// System prompt, `Context:` block and `Task:` block, each only when
    /// non-empty, joined by blank lines.
    pub fn build_prompt(&self, task: &str, context: Option<&str>) -> String {
        let mut parts = Vec::with_capacity(3);
        if !self.system_prompt.is_empty() {
            parts.push(self.system_prompt.clone());
        }
        if let Some(ctx) = context.filter(|c| !c.is_empty()) {
            parts.push(format!("Context:\n{ctx}"));
        }
        parts.push(format!("Task:\n{task}"));
        parts.join("\n\n")
    }

    /// Run the task on the backend. Never fails; see [`AgentResponse::is_success`].
    pub async fn invoke(&self, task: &str, context: Option<&str>) -> AgentResponse {
        self.invoke_timed(task, context).await.response
    }

    /// [`Self::invoke`], also returning the prompt and elapsed time
    pub async fn invoke_timed(&self, task: &str, context: Option<&str>) -> Invocation {
        let prompt = self.build_prompt(task, context);
        debug!(
            agent = %self.name,
            role = %self.role,
            backend = self.backend.name(),
            prompt_chars = prompt.chars().count(),
            "Invoking agent"
        );

        let started = Instant::now();
        let result = self.backend.run(&prompt, &self.options).await;
        let elapsed = started.elapsed();

        let response = AgentResponse::from_backend_result(&self.name, self.role, &result);
        debug!(
            agent = %self.name,
            success = response.is_success(),
            verdict = ?response.verdict(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Agent returned"
        );

        Invocation {
            prompt,
            response,
            elapsed,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use moa_domain::Verdict;

    fn agent_with(replies: Vec<Scripted>) -> (Agent, Arc<ScriptedBackend>) {
        let backend = Arc::new(ScriptedBackend::new("mock", replies));
        let agent = Agent::new("critic", AgentRole::Critic, backend.clone(), "You review.");
        (agent, backend)
    }

    #[test]
    fn test_build_prompt_layout() {
        let (agent, _) = agent_with(vec![]);
        assert_eq!(
            agent.build_prompt("Review it", Some("the code")),
            "You review.\n\nContext:\nthe code\n\nTask:\nReview it"
        );
        assert_eq!(
            agent.build_prompt("Review it", Some("")),
            "You review.\n\nTask:\nReview it"
        );
        let bare = agent.with_prompt("");
        assert_eq!(bare.build_prompt("Go", None), "Task:\nGo");
    }

    #[tokio::test]
    async fn test_invoke_parses_verdict() {
        let (agent, backend) = agent_with(vec![text("Looks good.\nVERDICT: PASS")]);
        let response = agent.invoke("Review", Some("code")).await;

        assert!(response.is_success());
        assert_eq!(response.verdict(), Some(Verdict::Pass));
        assert_eq!(backend.calls(), 1);
        assert!(backend.prompt(0).ends_with("Task:\nReview"));
    }

    #[tokio::test]
    async fn test_invoke_failure_has_no_verdict() {
        let (agent, _) = agent_with(vec![error("Timeout after 300s")]);
        let response = agent.invoke("Review", None).await;

        assert!(!response.is_success());
        assert_eq!(response.verdict(), None);
        assert_eq!(response.error(), Some("Timeout after 300s"));
    }

    #[tokio::test]
    async fn test_with_backend_swaps_only_backend() {
        let (agent, _) = agent_with(vec![]);
        let other = Arc::new(ScriptedBackend::new("other", vec![text("FAIL")]));
        let swapped = agent.with_backend(other.clone());

        assert_eq!(swapped.name(), "critic");
        assert_eq!(swapped.system_prompt(), "You review.");
        assert_eq!(swapped.backend().name(), "other");

        let response = swapped.invoke("x", None).await;
        assert_eq!(response.verdict(), Some(Verdict::Fail));
        assert_eq!(other.calls(), 1);
    }

    #[test]
    fn test_for_role_uses_default_prompt() {
        let backend = Arc::new(ScriptedBackend::new("mock", vec![]));
        let agent = Agent::for_role("architect", AgentRole::Architect, backend);
        assert_eq!(
            agent.system_prompt(),
            RolePromptTemplate::system_prompt(AgentRole::Architect)
        );
    }
}
