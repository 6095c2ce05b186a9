//! Application layer for moa-orchestrator
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::WorkflowConfig;
pub use ports::{
    backend::Backend,
    context_store::{ContextStore, ContextStoreError, InMemoryContextStore},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    progress::{NoProgress, WorkflowProgressNotifier},
    test_gate::{AlwaysPass, TestGate},
};
pub use use_cases::agent::{Agent, Invocation};
pub use use_cases::memory_bank::{CompactionOutcome, MemoryBank, MemoryBankError};
pub use use_cases::run_loop::{
    AgentLoop, DEFAULT_MAX_TURNS, LoopStop, RunLoopError, RunLoopUseCase, StopCondition,
};
pub use use_cases::run_pipeline::{
    Pipeline, PipelineBuilder, PipelineStep, RunPipelineError, RunPipelineUseCase,
};
pub use use_cases::run_workflow::{RunMoaWorkflowUseCase, RunWorkflowError};
