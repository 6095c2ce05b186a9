//! Verdict domain
//!
//! A verdict is a closed-set classification heuristically extracted from a
//! free-form review. Backends drift in how they format the final decision,
//! so extraction is an ordered chain of independent matchers:
//!
//! | Priority | Matcher | Looks at |
//! |----------|---------|----------|
//! | 1 | [`parsing::labelled_verdict`] | `VERDICT: PASS` / `VERDICT:FAIL` anywhere |
//! | 2 | [`parsing::trailing_bare_token`] | bare `PASS` / `FAIL` in the last 100 chars |
//! | 3 | [`parsing::needs_revision_marker`] | `NEEDS_REVISION` anywhere |
//!
//! When nothing matches the verdict is `None`; that is not an error.

pub mod parsing;

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

pub use parsing::{VERDICT_MATCHERS, VerdictMatcher, parse_verdict, parse_verdict_with_source};

/// Outcome of a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Pass,
    Fail,
    NeedsRevision,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::NeedsRevision => "NEEDS_REVISION",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Verdict {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PASS" => Ok(Verdict::Pass),
            "FAIL" => Ok(Verdict::Fail),
            "NEEDS_REVISION" => Ok(Verdict::NeedsRevision),
            other => Err(DomainError::UnknownVerdict(other.to_string())),
        }
    }
}
