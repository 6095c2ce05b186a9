//! Subprocess backend
//!
//! Runs a command-line AI tool once per prompt and captures its stdout.

use crate::config::{FileBackendConfig, PromptMode};
use async_trait::async_trait;
use moa_application::ports::backend::Backend;
use moa_domain::core::string::truncate;
use moa_domain::{BackendOptions, BackendResult};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default timeout for one backend call (5 minutes)
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Why a subprocess call failed
///
/// Never leaves this module as an `Err`: [`ProcessBackend::run`] turns it
/// into a failed [`BackendResult`].
#[derive(Error, Debug)]
pub enum ProcessBackendError {
    #[error("Executable not found: {0}")]
    NotFound(String),

    #[error("Timeout after {0}s")]
    Timeout(u64),

    #[error("Failed to spawn {command}: {message}")]
    Spawn { command: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("{0}")]
    NonZeroExit(String),
}

/// Backend wrapping a command-line tool
#[derive(Debug, Clone)]
pub struct ProcessBackend {
    name: String,
    command: String,
    args: Vec<String>,
    prompt_mode: PromptMode,
    model: Option<String>,
    model_arg: Option<String>,
    timeout: Duration,
    working_dir: Option<PathBuf>,
    env: BTreeMap<String, String>,
}

impl ProcessBackend {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            prompt_mode: PromptMode::default(),
            model: None,
            model_arg: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            working_dir: None,
            env: BTreeMap::new(),
        }
    }

    /// Build from a `[backends.<name>]` section
    pub fn from_config(name: impl Into<String>, config: &FileBackendConfig) -> Self {
        let mut backend = Self::new(name, config.command.clone())
            .with_args(config.args.clone())
            .with_prompt_mode(config.prompt_mode)
            .with_timeout(Duration::from_secs(config.timeout_seconds));
        backend.model = config.model.clone();
        backend.model_arg = config.model_arg.clone();
        if let Some(dir) = &config.working_dir {
            backend = backend.with_working_dir(dir.clone());
        }
        for (key, value) in &config.env {
            backend = backend.with_env(key.clone(), value.clone());
        }
        backend
    }

    // ==================== Builder Methods ====================

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_prompt_mode(mut self, mode: PromptMode) -> Self {
        self.prompt_mode = mode;
        self
    }

    /// Model name, passed as `{model_arg} {model}` when `model_arg` is set
    pub fn with_model(mut self, model: impl Into<String>, model_arg: Option<String>) -> Self {
        self.model = Some(model.into());
        self.model_arg = model_arg;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn build_command(&self, prompt: &str, options: &BackendOptions, model: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args);

        if let (Some(flag), Some(model)) = (self.model_arg.as_deref(), model) {
            cmd.arg(flag).arg(model);
        }
        if self.prompt_mode == PromptMode::Arg {
            cmd.arg(prompt);
        }

        if let Some(dir) = options.working_dir.as_ref().or(self.working_dir.as_ref()) {
            cmd.current_dir(dir);
        }
        cmd.envs(&self.env);

        let stdin = match self.prompt_mode {
            PromptMode::Stdin => Stdio::piped(),
            PromptMode::Arg => Stdio::null(),
        };
        cmd.stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn execute(
        &self,
        prompt: &str,
        options: &BackendOptions,
        timeout: Duration,
        model: Option<&str>,
    ) -> Result<String, ProcessBackendError> {
        let mut cmd = self.build_command(prompt, options, model);
        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProcessBackendError::NotFound(self.command.clone())
            } else {
                ProcessBackendError::Spawn {
                    command: self.command.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        // Feed stdin concurrently so a chatty child can't block on a full stdout pipe
        let writer = child.stdin.take().map(|mut stdin| {
            let bytes = prompt.as_bytes().to_vec();
            tokio::spawn(async move {
                let written = stdin.write_all(&bytes).await;
                drop(stdin);
                written
            })
        });

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ProcessBackendError::Io(e.to_string()))?,
            Err(_) => return Err(ProcessBackendError::Timeout(timeout.as_secs())),
        };

        if let Some(writer) = writer
            && let Ok(Err(e)) = writer.await
        {
            debug!(backend = %self.name, error = %e, "Child closed stdin early");
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                match output.status.code() {
                    Some(code) => format!("Exit code: {code}"),
                    None => "Terminated by signal".to_string(),
                }
            } else {
                stderr
            };
            return Err(ProcessBackendError::NonZeroExit(message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl Backend for ProcessBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, prompt: &str, options: &BackendOptions) -> BackendResult {
        let timeout = options.timeout.unwrap_or(self.timeout);
        let model = options.model.clone().or_else(|| self.model.clone());
        debug!(
            backend = %self.name,
            command = %self.command,
            timeout_secs = timeout.as_secs(),
            prompt = %truncate(prompt, 120),
            "Running process backend"
        );

        let started = Instant::now();
        let outcome = self.execute(prompt, options, timeout, model.as_deref()).await;
        let elapsed = started.elapsed();

        let result = match outcome {
            Ok(stdout) => BackendResult::success(&self.name, stdout),
            Err(e) => {
                warn!(backend = %self.name, error = %e, "Process backend failed");
                BackendResult::failure(&self.name, e.to_string())
            }
        };
        result
            .with_model(model.unwrap_or_default())
            .with_execution_time(elapsed)
            .with_metadata("command", self.command.clone())
    }

    async fn is_available(&self) -> bool {
        which::which(&self.command).is_ok()
    }
}
