//! Backend configuration from TOML (`[backends.<name>]` sections)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// How the prompt reaches the child process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    /// Appended as the last argument
    #[default]
    Arg,
    /// Written to stdin
    Stdin,
}

/// Raw process backend configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Executable name or path
    pub command: String,
    /// Arguments placed before the model flag and prompt
    pub args: Vec<String>,
    pub prompt_mode: PromptMode,
    pub model: Option<String>,
    /// Flag used to pass `model` (e.g. `-m`); the model is not passed without it
    pub model_arg: Option<String>,
    pub timeout_seconds: u64,
    pub working_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
            args: Vec::new(),
            prompt_mode: PromptMode::Arg,
            model: None,
            model_arg: None,
            timeout_seconds: 300,
            working_dir: None,
            env: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_section_deserialize() {
        let toml_str = r#"
[backends.local]
command = "ollama"
args = ["run", "llama3"]
prompt_mode = "stdin"
timeout_seconds = 120

[backends.local.env]
OLLAMA_HOST = "127.0.0.1"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let local = &config.backends["local"];
        assert_eq!(local.command, "ollama");
        assert_eq!(local.args, vec!["run", "llama3"]);
        assert_eq!(local.prompt_mode, PromptMode::Stdin);
        assert_eq!(local.timeout_seconds, 120);
        assert_eq!(local.env["OLLAMA_HOST"], "127.0.0.1");
        assert!(local.model.is_none());
    }
}
