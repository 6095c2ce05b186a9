//! Task prompts for each phase of the MoA workflow

use crate::core::string::excerpt;
use crate::verdict::Verdict;

/// Characters of plan/implementation/review kept in the active context.
pub const EXCERPT_CHARS: usize = 500;

/// Templates for the per-phase task prompts
pub struct WorkflowPromptTemplate;

impl WorkflowPromptTemplate {
    /// PLANNING task for the architect
    pub fn design_task(goal: &str) -> String {
        format!("Design solution for: {}", goal)
    }

    /// CODING task for the executor (plan goes in as context)
    pub fn implement_task() -> &'static str {
        "Implement this design"
    }

    /// REVIEWING task for the critic (implementation goes in as context)
    pub fn review_task() -> &'static str {
        r#"Review this implementation briefly.
Is it correct and complete for the task?

You MUST end your response with exactly one of:
VERDICT: PASS
or
VERDICT: FAIL"#
    }

    /// FIX task for the executor (previous implementation goes in as context)
    pub fn fix_task(review: &str) -> String {
        format!("Fix based on this feedback: {}", review)
    }

    /// Prompt sent to the summarizer during Memory Bank compaction
    pub fn compaction_prompt(context: &str) -> String {
        format!(
            r#"Summarize this context, preserving key decisions and current state:

{}

Provide a condensed version that captures:
1. Core goal and success criteria
2. Key architectural decisions
3. Current progress and blockers
4. Immediate next steps"#,
            context
        )
    }

    /// Active-context body written after each REVIEWING phase
    pub fn iteration_summary_with_excerpt(
        iteration: usize,
        verdict: Option<Verdict>,
        plan: &str,
        implementation: &str,
        review: &str,
        excerpt_chars: usize,
    ) -> String {
        let verdict_str = verdict.map(|v| v.as_str()).unwrap_or("PENDING");
        let next_steps = if verdict == Some(Verdict::Pass) {
            "Task complete!"
        } else {
            "Fix issues and iterate"
        };

        format!(
            r#"## Current State
- Status: ITERATION {iteration}
- Phase: REVIEWING (just completed)
- Verdict: {verdict_str}

## Latest Plan Summary
{plan}

## Latest Implementation Summary
{implementation}

## Latest Review
{review}

## Next Steps
{next_steps}
"#,
            plan = excerpt(plan, excerpt_chars),
            implementation = excerpt(implementation, excerpt_chars),
            review = excerpt(review, excerpt_chars),
        )
    }

    /// Default hand-off template for linear pipelines
    pub fn default_handoff_template() -> &'static str {
        "Based on the above, {task}"
    }

    /// Round-robin hand-off: the next agent reviews and extends the last response
    pub fn loop_handoff(last_response: &str) -> String {
        format!(
            "Review and continue: {}",
            excerpt(last_response, EXCERPT_CHARS)
        )
    }

    /// Render a hand-off template. Templates without `{task}` leave the task unchanged.
    pub fn render_handoff(template: &str, task: &str) -> String {
        if template.contains("{task}") {
            template.replace("{task}", task)
        } else {
            task.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_design_task_includes_goal() {
        assert_eq!(
            WorkflowPromptTemplate::design_task("Build a REST API"),
            "Design solution for: Build a REST API"
        );
    }

    #[test]
    fn test_review_task_demands_verdict() {
        let prompt = WorkflowPromptTemplate::review_task();
        assert!(prompt.ends_with("VERDICT: FAIL"));
    }

    #[test]
    fn test_iteration_summary_truncates_excerpts() {
        let long = "p".repeat(2000);
        let summary = WorkflowPromptTemplate::iteration_summary_with_excerpt(
            3,
            None,
            &long,
            "impl",
            "review text",
            EXCERPT_CHARS,
        );

        assert!(summary.contains("- Status: ITERATION 3"));
        assert!(summary.contains("- Verdict: PENDING"));
        assert!(summary.contains(&format!("{}...", "p".repeat(EXCERPT_CHARS))));
        assert!(!summary.contains(&"p".repeat(EXCERPT_CHARS + 1)));
        assert!(summary.contains("Fix issues and iterate"));
    }

    #[test]
    fn test_iteration_summary_after_pass() {
        let summary = WorkflowPromptTemplate::iteration_summary_with_excerpt(
            1,
            Some(Verdict::Pass),
            "plan",
            "impl",
            "VERDICT: PASS",
            EXCERPT_CHARS,
        );
        assert!(summary.contains("- Verdict: PASS"));
        assert!(summary.contains("Task complete!"));
    }

    #[test]
    fn test_loop_handoff_excerpts_last_response() {
        let long = "x".repeat(EXCERPT_CHARS * 2);
        let prompt = WorkflowPromptTemplate::loop_handoff(&long);
        assert_eq!(
            prompt,
            format!("Review and continue: {}...", "x".repeat(EXCERPT_CHARS))
        );
        assert_eq!(
            WorkflowPromptTemplate::loop_handoff("short"),
            "Review and continue: short..."
        );
    }

    #[test]
    fn test_render_handoff() {
        assert_eq!(
            WorkflowPromptTemplate::render_handoff("Based on the above, {task}", "review it"),
            "Based on the above, review it"
        );
        assert_eq!(
            WorkflowPromptTemplate::render_handoff("no placeholder", "review it"),
            "review it"
        );
    }
}
