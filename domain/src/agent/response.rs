//! [`AgentResponse`]: the parsed result of one agent invocation.

use super::role::AgentRole;
use crate::backend::BackendResult;
use crate::verdict::{Verdict, parse_verdict_with_source};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Structured response from an agent.
///
/// Built once from a [`BackendResult`] by [`AgentResponse::from_backend_result`]
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    content: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    verdict: Option<Verdict>,
    #[serde(default)]
    artifacts: Vec<PathBuf>,
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl AgentResponse {
    /// Parse a backend result into an agent response.
    ///
    /// Verdict extraction only runs on successful results; a failed call
    /// always has `verdict = None`.
    pub fn from_backend_result(agent: &str, role: AgentRole, result: &BackendResult) -> Self {
        let mut metadata = Map::new();
        metadata.insert("agent".into(), Value::from(agent));
        metadata.insert("role".into(), Value::from(role.as_str()));
        metadata.insert("backend".into(), Value::from(result.backend()));
        metadata.insert("model".into(), Value::from(result.model()));
        metadata.insert(
            "execution_time".into(),
            Value::from(result.execution_time().as_secs_f64()),
        );

        if !result.is_success() {
            if let Some(error) = result.error() {
                metadata.insert("error".into(), Value::from(error));
            }
            return Self {
                content: result.content().to_string(),
                success: false,
                verdict: None,
                artifacts: Vec::new(),
                metadata,
            };
        }

        let verdict = match parse_verdict_with_source(result.content()) {
            Some((verdict, matcher)) => {
                metadata.insert("verdict_matcher".into(), Value::from(matcher));
                Some(verdict)
            }
            None => None,
        };

        Self {
            content: result.content().to_string(),
            success: true,
            verdict,
            artifacts: reported_artifacts(result),
            metadata,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Error text of a failed call
    pub fn error(&self) -> Option<&str> {
        self.metadata.get("error").and_then(Value::as_str)
    }

    pub fn passed(&self) -> bool {
        self.verdict == Some(Verdict::Pass)
    }

    pub fn failed(&self) -> bool {
        self.verdict == Some(Verdict::Fail)
    }
}

/// Paths listed under the backend's `artifacts` metadata key, if any
fn reported_artifacts(result: &BackendResult) -> Vec<PathBuf> {
    result
        .metadata()
        .get("artifacts")
        .and_then(Value::as_array)
        .map(|paths| {
            paths
                .iter()
                .filter_map(Value::as_str)
                .map(PathBuf::from)
                .collect()
        })
        .unwrap_or_default()
}

impl std::fmt::Display for AgentResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}
