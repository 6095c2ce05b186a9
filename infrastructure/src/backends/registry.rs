//! Named backend lookup
//!
//! Built-in presets for common CLI tools, overridden or extended by
//! `[backends.<name>]` config sections.

use super::process::ProcessBackend;
use crate::config::{FileBackendConfig, PromptMode};
use moa_application::ports::backend::Backend;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown backend '{name}' (available: {available})")]
    UnknownBackend { name: String, available: String },
}

/// Backends by name
#[derive(Default)]
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn Backend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in presets, then every configured backend.
    ///
    /// A configured backend replaces a preset of the same name.
    pub fn from_config(backends: &BTreeMap<String, FileBackendConfig>) -> Self {
        Self::from_config_in(backends, None)
    }

    /// Like [`Self::from_config`]; backends without their own `working_dir`
    /// run in `working_dir`.
    pub fn from_config_in(
        backends: &BTreeMap<String, FileBackendConfig>,
        working_dir: Option<&Path>,
    ) -> Self {
        let resolve = |config: &FileBackendConfig| {
            let mut config = config.clone();
            if config.working_dir.is_none() {
                config.working_dir = working_dir.map(Path::to_path_buf);
            }
            config
        };

        let mut registry = Self::new();
        for (name, config) in builtin_presets() {
            registry.register(Arc::new(ProcessBackend::from_config(name, &resolve(&config))));
        }
        for (name, config) in backends {
            debug!(backend = %name, command = %config.command, "Registering configured backend");
            registry.register(Arc::new(ProcessBackend::from_config(
                name.clone(),
                &resolve(config),
            )));
        }
        registry
    }

    /// Add a backend under its own name, replacing any previous one
    pub fn register(&mut self, backend: Arc<dyn Backend>) {
        self.backends.insert(backend.name().to_string(), backend);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Backend>> {
        self.backends.get(name).cloned()
    }

    /// Like [`Self::get`], with an error listing what is available
    pub fn require(&self, name: &str) -> Result<Arc<dyn Backend>, RegistryError> {
        self.get(name).ok_or_else(|| RegistryError::UnknownBackend {
            name: name.to_string(),
            available: self.names().join(", "),
        })
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.backends.keys().cloned().collect();
        names.sort();
        names
    }

    /// Each backend with its availability, sorted by name
    pub async fn availability(&self) -> Vec<(String, bool)> {
        let mut report = Vec::with_capacity(self.backends.len());
        for name in self.names() {
            if let Some(backend) = self.backends.get(&name) {
                report.push((name, backend.is_available().await));
            }
        }
        report
    }
}

/// Presets for CLI tools that are commonly installed
pub fn builtin_presets() -> Vec<(&'static str, FileBackendConfig)> {
    vec![
        (
            "claude",
            FileBackendConfig {
                command: "claude".to_string(),
                args: vec!["-p".to_string()],
                prompt_mode: PromptMode::Arg,
                ..Default::default()
            },
        ),
        (
            "gemini",
            FileBackendConfig {
                command: "gemini".to_string(),
                model_arg: Some("-m".to_string()),
                prompt_mode: PromptMode::Arg,
                ..Default::default()
            },
        ),
        (
            "codex",
            FileBackendConfig {
                command: "codex".to_string(),
                args: vec!["exec".to_string()],
                prompt_mode: PromptMode::Arg,
                ..Default::default()
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_registered() {
        let registry = BackendRegistry::from_config(&BTreeMap::new());
        assert_eq!(registry.names(), vec!["claude", "codex", "gemini"]);
        assert!(registry.get("claude").is_some());
    }

    #[test]
    fn test_configured_backend_is_added() {
        let mut backends = BTreeMap::new();
        backends.insert(
            "local".to_string(),
            FileBackendConfig {
                command: "ollama".to_string(),
                args: vec!["run".to_string(), "llama3".to_string()],
                ..Default::default()
            },
        );
        let registry = BackendRegistry::from_config(&backends);
        assert_eq!(registry.require("local").unwrap().name(), "local");
    }

    #[test]
    fn test_require_unknown_lists_available() {
        let registry = BackendRegistry::from_config(&BTreeMap::new());
        let err = registry.require("gpt").err().unwrap();
        assert_eq!(
            err.to_string(),
            "Unknown backend 'gpt' (available: claude, codex, gemini)"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_default_working_dir_applies_to_configured_backends() {
        let dir = tempfile::tempdir().unwrap();
        let mut backends = BTreeMap::new();
        backends.insert(
            "where".to_string(),
            FileBackendConfig {
                command: "pwd".to_string(),
                prompt_mode: PromptMode::Stdin,
                ..Default::default()
            },
        );

        let registry = BackendRegistry::from_config_in(&backends, Some(dir.path()));
        let backend = registry.require("where").unwrap();
        let result = backend.run("", &moa_domain::BackendOptions::new()).await;

        let reported = std::fs::canonicalize(result.content()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[tokio::test]
    async fn test_availability_reports_every_backend() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(ProcessBackend::new(
            "missing",
            "moa-definitely-not-installed",
        )));
        let report = registry.availability().await;
        assert_eq!(report, vec![("missing".to_string(), false)]);
    }
}
