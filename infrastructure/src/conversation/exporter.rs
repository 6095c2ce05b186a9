//! Save and reload finished conversations as pretty-printed JSON.

use moa_domain::Conversation;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid conversation JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct ConversationExporter;

impl ConversationExporter {
    /// Write `conversation` to `path`, creating parent directories.
    pub fn save(conversation: &Conversation, path: &Path) -> Result<(), ExportError> {
        let io_err = |source| ExportError::Io {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(conversation)?;
        fs::write(path, json).map_err(io_err)?;

        info!(
            id = %conversation.id(),
            turns = conversation.turn_count(),
            "Conversation saved to {}",
            path.display()
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Conversation, ExportError> {
        let json = fs::read_to_string(path).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}
