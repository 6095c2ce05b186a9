//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod agent;
pub mod memory_bank;
pub mod run_loop;
pub mod run_pipeline;
pub mod run_workflow;
