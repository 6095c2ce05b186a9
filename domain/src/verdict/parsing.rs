//! Verdict extraction from free-form review text.
//!
//! These functions are pure domain logic: no I/O, just text pattern
//! matching. Each matcher is independent; [`parse_verdict`] evaluates them
//! in [`VERDICT_MATCHERS`] order and returns the first hit.
//!
//! If an explicit `VERDICT:` label and a disagreeing trailing token both
//! appear, the label wins because it is checked first.

use super::Verdict;
use crate::core::string::tail_chars;

/// How many trailing characters [`trailing_bare_token`] inspects.
pub const TAIL_WINDOW_CHARS: usize = 100;

/// A named verdict matcher
#[derive(Debug, Clone, Copy)]
pub struct VerdictMatcher {
    pub name: &'static str,
    pub matcher: fn(&str) -> Option<Verdict>,
}

/// Matchers in priority order
pub const VERDICT_MATCHERS: &[VerdictMatcher] = &[
    VerdictMatcher {
        name: "labelled_verdict",
        matcher: labelled_verdict,
    },
    VerdictMatcher {
        name: "trailing_bare_token",
        matcher: trailing_bare_token,
    },
    VerdictMatcher {
        name: "needs_revision_marker",
        matcher: needs_revision_marker,
    },
];

/// Extract a verdict from review text.
///
/// # Examples
///
/// ```
/// use moa_domain::verdict::{Verdict, parse_verdict};
///
/// assert_eq!(parse_verdict("Looks fine.\n\nVERDICT: PASS"), Some(Verdict::Pass));
/// assert_eq!(parse_verdict("Missing error handling.\nverdict:fail"), Some(Verdict::Fail));
/// assert_eq!(parse_verdict("the tests passed successfully"), None);
/// ```
pub fn parse_verdict(text: &str) -> Option<Verdict> {
    parse_verdict_with_source(text).map(|(verdict, _)| verdict)
}

/// Like [`parse_verdict`] but also reports which matcher fired.
pub fn parse_verdict_with_source(text: &str) -> Option<(Verdict, &'static str)> {
    VERDICT_MATCHERS
        .iter()
        .find_map(|m| (m.matcher)(text).map(|verdict| (verdict, m.name)))
}

/// Explicit `VERDICT: PASS` / `VERDICT:FAIL` label anywhere (case-insensitive).
pub fn labelled_verdict(text: &str) -> Option<Verdict> {
    let upper = text.to_uppercase();

    if upper.contains("VERDICT: PASS") || upper.contains("VERDICT:PASS") {
        Some(Verdict::Pass)
    } else if upper.contains("VERDICT: FAIL") || upper.contains("VERDICT:FAIL") {
        Some(Verdict::Fail)
    } else {
        None
    }
}

/// Bare `PASS` / `FAIL` at the very end of the text, or alone on a line
/// within the last [`TAIL_WINDOW_CHARS`] characters.
///
/// Only whole tokens count: `BYPASS` or `PASSED` never match. At the end of
/// running text the token must be upper-case, so prose like "all tests
/// pass" is ignored; a line holding nothing but the token matches in any case.
pub fn trailing_bare_token(text: &str) -> Option<Verdict> {
    let tail = tail_chars(text, TAIL_WINDOW_CHARS);

    // End of text, ignoring trailing punctuation and markdown emphasis
    let trimmed = tail.trim_end_matches(|c: char| !c.is_alphanumeric());
    if let Some(verdict) = token_at_end(trimmed) {
        return Some(verdict);
    }

    // A window cut mid-line starts with a fragment, not a whole line
    let cut = &text[..text.len() - tail.len()];
    let skip = usize::from(!cut.is_empty() && !cut.ends_with('\n'));

    // Otherwise the last line that holds nothing but a token
    let lines: Vec<&str> = tail.lines().skip(skip).collect();
    lines.into_iter().rev().find_map(|line| {
        let token = line.trim_matches(|c: char| !c.is_alphanumeric());
        if token.eq_ignore_ascii_case("PASS") {
            Some(Verdict::Pass)
        } else if token.eq_ignore_ascii_case("FAIL") {
            Some(Verdict::Fail)
        } else {
            None
        }
    })
}

/// `NEEDS_REVISION` anywhere (case-insensitive).
pub fn needs_revision_marker(text: &str) -> Option<Verdict> {
    text.to_uppercase()
        .contains("NEEDS_REVISION")
        .then_some(Verdict::NeedsRevision)
}

fn token_at_end(s: &str) -> Option<Verdict> {
    let (prefix, verdict) = if let Some(prefix) = s.strip_suffix("PASS") {
        (prefix, Verdict::Pass)
    } else if let Some(prefix) = s.strip_suffix("FAIL") {
        (prefix, Verdict::Fail)
    } else {
        return None;
    };

    let standalone = prefix
        .chars()
        .next_back()
        .is_none_or(|c| !c.is_alphanumeric() && c != '_');
    standalone.then_some(verdict)
}
