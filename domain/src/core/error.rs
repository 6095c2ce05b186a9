//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// These cover invalid construction of domain values. Backend failures are
/// never represented here: they travel as data (`success = false`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("max_iterations must be at least 1 (got {0})")]
    InvalidMaxIterations(usize),

    #[error("max_turns must be at least 1 (got {0})")]
    InvalidMaxTurns(usize),

    #[error("Goal cannot be empty")]
    EmptyGoal,

    #[error("Workflow requires at least one step")]
    NoSteps,

    #[error("Unknown agent role: {0}")]
    UnknownRole(String),

    #[error("Unknown verdict: {0}")]
    UnknownVerdict(String),
}

impl DomainError {
    /// Check if this error comes from invalid convergence settings
    pub fn is_convergence_error(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidMaxIterations(_) | DomainError::InvalidMaxTurns(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_max_iterations_display() {
        let error = DomainError::InvalidMaxIterations(0);
        assert_eq!(
            error.to_string(),
            "max_iterations must be at least 1 (got 0)"
        );
    }

    #[test]
    fn test_is_convergence_error() {
        assert!(DomainError::InvalidMaxIterations(0).is_convergence_error());
        assert!(DomainError::InvalidMaxTurns(0).is_convergence_error());
        assert!(!DomainError::EmptyGoal.is_convergence_error());
        assert!(!DomainError::NoSteps.is_convergence_error());
    }
}
