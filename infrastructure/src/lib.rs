//! Infrastructure layer for moa-orchestrator
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: subprocess backends, the file-backed
//! Memory Bank store, JSONL transcripts, conversation export and
//! configuration file loading.

pub mod backends;
pub mod config;
pub mod conversation;
pub mod logging;
pub mod memory;
pub mod test_gate;

// Re-export commonly used types
pub use backends::{BackendRegistry, ProcessBackend, ProcessBackendError, RegistryError};
pub use config::{
    ConfigLoader, ConfigValidationError, FileAgentsConfig, FileBackendConfig, FileConfig,
    FileLoggingConfig, FileOutputConfig, FileWorkflowConfig, PromptMode,
};
pub use conversation::{ConversationExporter, ExportError};
pub use logging::JsonlConversationLogger;
pub use memory::FileContextStore;
pub use test_gate::CommandTestGate;
