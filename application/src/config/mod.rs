//! Application-level configuration.
//!
//! - [`WorkflowConfig`]: convergence policy and loop parameters handed to the
//!   workflow use cases

pub mod workflow_config;

pub use workflow_config::WorkflowConfig;
