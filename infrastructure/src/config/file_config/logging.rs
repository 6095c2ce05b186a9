//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of workflow events
    pub conversation_log: Option<PathBuf>,
    /// Diagnostic log file (tracing output)
    pub file: Option<PathBuf>,
}
