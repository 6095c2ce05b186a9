//! Convergence criteria and stop reasons

use crate::core::error::DomainError;
use crate::verdict::Verdict;
use serde::{Deserialize, Serialize};

/// Why the loop stopped (or didn't)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Critic passed (and tests, when required)
    Success,
    /// Iteration cap hit without success
    MaxIterationsReached,
    /// Keep iterating
    Continue,
    /// A phase's backend call failed; set by the orchestrator, never by
    /// [`ConvergenceCriteria::should_stop`]
    BackendError,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Success => "success",
            StopReason::MaxIterationsReached => "max_iterations_reached",
            StopReason::Continue => "continue",
            StopReason::BackendError => "backend_error",
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Default `max_iterations`
pub const DEFAULT_MAX_ITERATIONS: usize = 5;
/// Default compaction threshold (~12k tokens)
pub const DEFAULT_CONTEXT_CHAR_LIMIT: usize = 50_000;

/// Criteria for determining when the MoA workflow should stop.
///
/// `max_iterations` is always at least 1; [`ConvergenceCriteria::new`] and
/// deserialization both reject 0, so no loop driven by these criteria can
/// be unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCriteria", into = "RawCriteria")]
pub struct ConvergenceCriteria {
    max_iterations: usize,
    require_critic_pass: bool,
    require_tests_pass: bool,
    context_char_limit: usize,
}

impl ConvergenceCriteria {
    /// Criteria with the given iteration cap and default flags.
    pub fn new(max_iterations: usize) -> Result<Self, DomainError> {
        if max_iterations == 0 {
            return Err(DomainError::InvalidMaxIterations(max_iterations));
        }
        Ok(Self {
            max_iterations,
            ..Self::default()
        })
    }

    // ==================== Builder Methods ====================

    pub fn with_require_critic_pass(mut self, require: bool) -> Self {
        self.require_critic_pass = require;
        self
    }

    pub fn with_require_tests_pass(mut self, require: bool) -> Self {
        self.require_tests_pass = require;
        self
    }

    pub fn with_context_char_limit(mut self, limit: usize) -> Self {
        self.context_char_limit = limit;
        self
    }

    // ==================== Accessors ====================

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn require_critic_pass(&self) -> bool {
        self.require_critic_pass
    }

    pub fn require_tests_pass(&self) -> bool {
        self.require_tests_pass
    }

    pub fn context_char_limit(&self) -> usize {
        self.context_char_limit
    }

    /// Decide whether to stop after `iteration` (1-based).
    ///
    /// The iteration cap wins over any verdict.
    pub fn should_stop(
        &self,
        iteration: usize,
        critic_verdict: Option<Verdict>,
        test_result: bool,
    ) -> (bool, StopReason) {
        if iteration >= self.max_iterations {
            return (true, StopReason::MaxIterationsReached);
        }
        if self.require_critic_pass
            && critic_verdict == Some(Verdict::Pass)
            && (!self.require_tests_pass || test_result)
        {
            return (true, StopReason::Success);
        }
        (false, StopReason::Continue)
    }
}

impl Default for ConvergenceCriteria {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            require_critic_pass: true,
            require_tests_pass: false,
            context_char_limit: DEFAULT_CONTEXT_CHAR_LIMIT,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
struct RawCriteria {
    max_iterations: usize,
    require_critic_pass: bool,
    require_tests_pass: bool,
    context_char_limit: usize,
}

impl Default for RawCriteria {
    fn default() -> Self {
        ConvergenceCriteria::default().into()
    }
}

impl TryFrom<RawCriteria> for ConvergenceCriteria {
    type Error = DomainError;

    fn try_from(raw: RawCriteria) -> Result<Self, Self::Error> {
        Ok(ConvergenceCriteria::new(raw.max_iterations)?
            .with_require_critic_pass(raw.require_critic_pass)
            .with_require_tests_pass(raw.require_tests_pass)
            .with_context_char_limit(raw.context_char_limit))
    }
}

impl From<ConvergenceCriteria> for RawCriteria {
    fn from(c: ConvergenceCriteria) -> Self {
        Self {
            max_iterations: c.max_iterations,
            require_critic_pass: c.require_critic_pass,
            require_tests_pass: c.require_tests_pass,
            context_char_limit: c.context_char_limit,
        }
    }
}
