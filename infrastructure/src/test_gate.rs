//! Shell-command test gate
//!
//! Runs a configured command (e.g. `cargo test`) through the platform shell
//! after each review; exit status 0 counts as passing.

use async_trait::async_trait;
use moa_application::TestGate;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, warn};

pub const DEFAULT_TEST_TIMEOUT_SECS: u64 = 600;

pub struct CommandTestGate {
    command: String,
    timeout: Duration,
}

impl CommandTestGate {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: Duration::from_secs(DEFAULT_TEST_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn shell(&self) -> Command {
        if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", &self.command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", &self.command]);
            c
        }
    }
}

#[async_trait]
impl TestGate for CommandTestGate {
    async fn run(&self, working_dir: Option<&Path>) -> bool {
        let mut cmd = self.shell();
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(command = %self.command, "Failed to spawn test command: {}", e);
                return false;
            }
            Err(_) => {
                warn!(
                    command = %self.command,
                    "Test command timed out after {}s",
                    self.timeout.as_secs()
                );
                return false;
            }
        };

        let passed = output.status.success();
        if passed {
            info!(command = %self.command, "Tests passed");
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                command = %self.command,
                code = output.status.code().unwrap_or(-1),
                "Tests failed: {}",
                stderr.trim()
            );
        }
        passed
    }
}
