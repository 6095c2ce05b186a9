//! Convergence policy
//!
//! [`ConvergenceCriteria`] decides when the plan → implement → review loop
//! may stop. It is a pure, stateless value.

pub mod criteria;

pub use criteria::{ConvergenceCriteria, StopReason};
