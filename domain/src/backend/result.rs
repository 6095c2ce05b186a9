//! [`BackendResult`]: what a backend returns for a single prompt.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Result of a single backend call.
///
/// Failures are data, not errors: `success` is false and `error` carries
/// the reason. Once returned the value is never modified; the `with_*`
/// builders consume `self` and are only used while constructing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendResult {
    content: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    model: String,
    backend: String,
    #[serde(with = "duration_secs")]
    execution_time: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl BackendResult {
    /// Successful completion with the generated text.
    pub fn success(backend: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            success: true,
            error: None,
            model: String::new(),
            backend: backend.into(),
            execution_time: Duration::ZERO,
            session_id: None,
            metadata: Map::new(),
        }
    }

    /// Failed call. Content is empty.
    pub fn failure(backend: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            success: false,
            error: Some(error.into()),
            model: String::new(),
            backend: backend.into(),
            execution_time: Duration::ZERO,
            session_id: None,
            metadata: Map::new(),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_execution_time(mut self, elapsed: Duration) -> Self {
        self.execution_time = elapsed;
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    // ==================== Accessors ====================

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn execution_time(&self) -> Duration {
        self.execution_time
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }
}

pub(crate) mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}
