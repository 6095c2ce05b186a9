//! Conversation entities

use crate::agent::{AgentResponse, AgentRole};
use crate::convergence::StopReason;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static CONVERSATION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Default number of turns rendered by [`Conversation::context`].
pub const DEFAULT_CONTEXT_TURNS: usize = 10;

/// One recorded agent invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub agent_name: String,
    pub role: AgentRole,
    pub prompt: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
    #[serde(with = "crate::backend::result::duration_secs")]
    pub execution_time: Duration,
    pub backend: String,
    #[serde(default)]
    pub model: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ConversationTurn {
    /// Record an agent response as a turn, stamped with the current time.
    pub fn from_response(
        agent_name: impl Into<String>,
        role: AgentRole,
        prompt: impl Into<String>,
        response: &AgentResponse,
        execution_time: Duration,
    ) -> Self {
        let meta_str = |key: &str| {
            response
                .metadata()
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            agent_name: agent_name.into(),
            role,
            prompt: prompt.into(),
            response: response.content().to_string(),
            timestamp: Utc::now(),
            execution_time,
            backend: meta_str("backend"),
            model: meta_str("model"),
            success: response.is_success(),
            error: response.error().map(str::to_string),
            metadata: response.metadata().clone(),
        }
    }
}

/// Lifecycle status of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    #[default]
    Active,
    Completed,
    Failed,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStatus::Active => "active",
            ConversationStatus::Completed => "completed",
            ConversationStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConversationStatus::Active)
    }
}

impl std::fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Run summary attached to a finished conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<StopReason>,
    /// Phase whose backend call failed, for `backend_error` stops
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_phase: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// A full multi-agent conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    id: String,
    goal: String,
    turns: Vec<ConversationTurn>,
    status: ConversationStatus,
    created_at: DateTime<Utc>,
    metadata: ConversationMetadata,
}

impl Conversation {
    /// Start a conversation with a fresh id and no turns.
    pub fn new(goal: impl Into<String>) -> Self {
        let created_at = Utc::now();
        let seq = CONVERSATION_SEQ.fetch_add(1, Ordering::Relaxed);
        Self {
            id: format!("conv_{}_{}", created_at.timestamp_millis(), seq),
            goal: goal.into(),
            turns: Vec::new(),
            status: ConversationStatus::Active,
            created_at,
            metadata: ConversationMetadata::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn status(&self) -> ConversationStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn metadata(&self) -> &ConversationMetadata {
        &self.metadata
    }

    /// Append a turn. Existing turns are never touched.
    pub fn add_turn(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// Render the goal plus the `max_turns` most recent turns, oldest first.
    ///
    /// Older turns are left out of the rendering but stay in the log.
    pub fn context(&self, max_turns: usize) -> String {
        let start = self.turns.len().saturating_sub(max_turns);

        let mut parts = vec![format!("Goal: {}\n", self.goal)];
        for turn in &self.turns[start..] {
            parts.push(format!(
                "\n[{} ({})]:\n{}\n",
                turn.agent_name, turn.role, turn.response
            ));
        }
        parts.join("\n")
    }

    /// Response text of the most recent turn
    pub fn last_response(&self) -> Option<&str> {
        self.turns.last().map(|t| t.response.as_str())
    }

    /// Mark the run as finished.
    ///
    /// `Success` maps to `Completed`; every other reason maps to `Failed`.
    pub fn finish(&mut self, iterations: usize, reason: StopReason) {
        self.status = if reason == StopReason::Success {
            ConversationStatus::Completed
        } else {
            ConversationStatus::Failed
        };
        self.metadata.iterations = Some(iterations);
        self.metadata.final_status = Some(self.status.as_str().to_string());
        self.metadata.reason = Some(reason);
    }

    /// Mark a linear pipeline as finished without iteration semantics.
    pub fn set_status(&mut self, status: ConversationStatus) {
        self.status = status;
        self.metadata.final_status = Some(status.as_str().to_string());
    }

    pub fn set_failed_phase(&mut self, phase: impl Into<String>) {
        self.metadata.failed_phase = Some(phase.into());
    }

    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.extra.insert(key.into(), value.into());
    }
}
