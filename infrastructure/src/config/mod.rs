//! Configuration file loading for moa-orchestrator
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./moa.toml` or `./.moa.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/moa-orchestrator/config.toml`
//! 4. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAgentsConfig, FileBackendConfig, FileConfig, FileLoggingConfig,
    FileOutputConfig, FileWorkflowConfig, PromptMode,
};
pub use loader::ConfigLoader;
