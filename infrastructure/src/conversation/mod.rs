//! Conversation persistence

mod exporter;

pub use exporter::{ConversationExporter, ExportError};
