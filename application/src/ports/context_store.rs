//! Context store port
//!
//! Persistence for the three Memory Bank documents. A store is
//! single-writer: no locking is done across processes.

use moa_domain::MemorySection;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextStoreError {
    #[error("Failed to read {section}: {message}")]
    Read {
        section: MemorySection,
        message: String,
    },

    #[error("Failed to write {section}: {message}")]
    Write {
        section: MemorySection,
        message: String,
    },

    #[error("Failed to remove {section}: {message}")]
    Remove {
        section: MemorySection,
        message: String,
    },

    #[error("Context store lock poisoned")]
    Poisoned,
}

/// Storage for Memory Bank documents
pub trait ContextStore: Send + Sync {
    /// Read a document; `None` when it has never been written
    fn read(&self, section: MemorySection) -> Result<Option<String>, ContextStoreError>;

    /// Overwrite a document, creating it (and its parents) when missing
    fn write(&self, section: MemorySection, content: &str) -> Result<(), ContextStoreError>;

    /// Delete a document; missing documents are not an error
    fn remove(&self, section: MemorySection) -> Result<(), ContextStoreError>;

    fn exists(&self, section: MemorySection) -> bool;

    /// Directory backing the store, if any
    fn location(&self) -> Option<&Path> {
        None
    }

    /// Delete every document
    fn clear(&self) -> Result<(), ContextStoreError> {
        for section in MemorySection::ALL {
            self.remove(section)?;
        }
        Ok(())
    }
}

/// Store kept entirely in memory, for tests and dry runs
#[derive(Default)]
pub struct InMemoryContextStore {
    documents: Mutex<HashMap<MemorySection, String>>,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContextStore for InMemoryContextStore {
    fn read(&self, section: MemorySection) -> Result<Option<String>, ContextStoreError> {
        let docs = self
            .documents
            .lock()
            .map_err(|_| ContextStoreError::Poisoned)?;
        Ok(docs.get(&section).cloned())
    }

    fn write(&self, section: MemorySection, content: &str) -> Result<(), ContextStoreError> {
        let mut docs = self
            .documents
            .lock()
            .map_err(|_| ContextStoreError::Poisoned)?;
        docs.insert(section, content.to_string());
        Ok(())
    }

    fn remove(&self, section: MemorySection) -> Result<(), ContextStoreError> {
        let mut docs = self
            .documents
            .lock()
            .map_err(|_| ContextStoreError::Poisoned)?;
        docs.remove(&section);
        Ok(())
    }

    fn exists(&self, section: MemorySection) -> bool {
        self.documents
            .lock()
            .map(|docs| docs.contains_key(&section))
            .unwrap_or(false)
    }
}
