//! Seed content for a fresh Memory Bank

use chrono::{DateTime, SecondsFormat, Utc};

pub struct MemoryTemplates;

impl MemoryTemplates {
    pub fn product_context(goal: &str, project_info: &str) -> String {
        format!(
            r#"# Product Context

## Goal
{goal}

## Project Info
{project_info}

## Success Criteria
- [ ] Define during planning phase

## Constraints
- [ ] Define any constraints or requirements
"#
        )
    }

    pub fn initial_active_body() -> &'static str {
        r#"## Current State
- Status: INITIALIZED
- Phase: PLANNING
- Iteration: 0

## What We're Working On
(To be updated by agents)

## Recent Progress
(Empty - just started)

## Blockers
(None yet)

## Next Steps
1. Generate implementation plan
"#
    }

    pub fn system_patterns() -> &'static str {
        r#"# System Patterns

## Architectural Decisions
(To be populated during design phase)

## Code Patterns
(To be populated during implementation)

## API Contracts
(Define interfaces between components)

## Lessons Learned
(Updated after each iteration)
"#
    }

    /// `# Active Context` header stamped with `at`
    pub fn active_header(at: DateTime<Utc>) -> String {
        format!(
            "# Active Context\n_Last updated: {}_\n\n",
            at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }

    /// `## Current State` block; the iteration line is omitted when `None`
    pub fn current_state(status: &str, phase: &str, iteration: Option<usize>) -> String {
        let mut block = format!("## Current State\n- Status: {status}\n- Phase: {phase}");
        if let Some(n) = iteration {
            block.push_str(&format!("\n- Iteration: {n}"));
        }
        block
    }
}
