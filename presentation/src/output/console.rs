//! Console output formatter for workflow conversations

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use moa_domain::{AgentRole, Conversation, ConversationStatus, ConversationTurn, parse_verdict};

/// Formats conversations for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Force colored output on or off for the whole process
    pub fn set_color(enabled: bool) {
        colored::control::set_override(enabled);
    }

    /// Outcome block plus the final review
    pub fn format_summary(conversation: &Conversation) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("MoA Workflow Result"));
        output.push('\n');
        output.push_str(&Self::outcome(conversation));

        if let Some(review) = Self::final_review(conversation) {
            let verdict = parse_verdict(&review.response)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "none".to_string());
            output.push_str(&Self::section_header(&format!(
                "Final review ({}) - verdict: {}",
                review.agent_name, verdict
            )));
            output.push_str(&format!("\n{}\n", review.response));
        } else if let Some(last) = conversation.last_response() {
            output.push_str(&Self::section_header("Last response"));
            output.push_str(&format!("\n{}\n", last));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Every turn in call order
    pub fn format_full(conversation: &Conversation) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("MoA Workflow Transcript"));
        output.push('\n');
        output.push_str(&Self::outcome(conversation));
        output.push_str(&Self::section_header("Turns"));

        for (index, turn) in conversation.turns().iter().enumerate() {
            let title = format!(
                "── [{}] {} ({}) · {} · {:.1}s ──",
                index + 1,
                turn.agent_name,
                turn.role,
                if turn.backend.is_empty() { "?" } else { turn.backend.as_str() },
                turn.execution_time.as_secs_f64()
            );
            if turn.success {
                output.push_str(&format!("\n{}\n{}\n", title.yellow().bold(), turn.response));
            } else {
                output.push_str(&format!(
                    "\n{}\nError: {}\n",
                    title.red().bold(),
                    turn.error.as_deref().unwrap_or("Unknown")
                ));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(conversation: &Conversation) -> String {
        serde_json::to_string_pretty(conversation).unwrap_or_else(|_| "{}".to_string())
    }

    fn outcome(conversation: &Conversation) -> String {
        let metadata = conversation.metadata();
        let status = match conversation.status() {
            ConversationStatus::Completed => "completed".green().bold(),
            ConversationStatus::Failed => "failed".red().bold(),
            ConversationStatus::Active => "active".yellow().bold(),
        };

        let mut output = format!(
            "{} {}\n{} {}\n",
            "Goal:".cyan().bold(),
            conversation.goal(),
            "Status:".cyan().bold(),
            status
        );
        if let Some(iterations) = metadata.iterations {
            output.push_str(&format!("{} {}\n", "Iterations:".cyan().bold(), iterations));
        }
        if let Some(reason) = metadata.reason {
            output.push_str(&format!("{} {}\n", "Reason:".cyan().bold(), reason.as_str()));
        }
        if let Some(phase) = &metadata.failed_phase {
            output.push_str(&format!("{} {}\n", "Failed phase:".red().bold(), phase));
        }
        output.push_str(&format!(
            "{} {}\n",
            "Turns:".cyan().bold(),
            conversation.turn_count()
        ));
        output
    }

    fn final_review(conversation: &Conversation) -> Option<&ConversationTurn> {
        conversation
            .turns()
            .iter()
            .rev()
            .find(|turn| turn.role == AgentRole::Critic && turn.success)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_summary(&self, conversation: &Conversation) -> String {
        Self::format_summary(conversation)
    }

    fn format_full(&self, conversation: &Conversation) -> String {
        Self::format_full(conversation)
    }

    fn format_json(&self, conversation: &Conversation) -> String {
        Self::format_json(conversation)
    }
}
