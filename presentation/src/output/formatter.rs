//! Output formatter trait

use moa_domain::{Conversation, OutputFormat};

/// Trait for rendering a finished conversation
pub trait OutputFormatter {
    /// Outcome, final verdict and the last review
    fn format_summary(&self, conversation: &Conversation) -> String;

    /// Every turn in order
    fn format_full(&self, conversation: &Conversation) -> String;

    /// Format as JSON
    fn format_json(&self, conversation: &Conversation) -> String;

    fn format(&self, conversation: &Conversation, format: OutputFormat) -> String {
        match format {
            OutputFormat::Summary => self.format_summary(conversation),
            OutputFormat::Full => self.format_full(conversation),
            OutputFormat::Json => self.format_json(conversation),
        }
    }
}
