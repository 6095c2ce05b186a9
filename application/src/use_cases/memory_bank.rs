//! Memory Bank service
//!
//! Durable, human-readable project context in three Markdown documents.
//! All reads and writes go through a [`ContextStore`]; a Memory Bank assumes
//! it is the only writer of its store.

use crate::ports::backend::Backend;
use crate::ports::context_store::{ContextStore, ContextStoreError, InMemoryContextStore};
use chrono::Utc;
use moa_domain::memory::{
    active_context_document, compose_context, replace_current_state, replace_or_append_section,
};
use moa_domain::{BackendOptions, MemorySection, MemoryTemplates, WorkflowPromptTemplate};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum MemoryBankError {
    #[error("Memory Bank store error: {0}")]
    Store(#[from] ContextStoreError),
}

/// What [`MemoryBank::compact`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompactionOutcome {
    /// Active context replaced by the summary
    Compacted {
        before_chars: usize,
        after_chars: usize,
    },
    /// Summarizer failed; the Memory Bank was left untouched
    Skipped { reason: String },
}

impl CompactionOutcome {
    pub fn is_compacted(&self) -> bool {
        matches!(self, CompactionOutcome::Compacted { .. })
    }
}

/// File-style project context shared across iterations
#[derive(Clone)]
pub struct MemoryBank {
    store: Arc<dyn ContextStore>,
}

impl MemoryBank {
    pub fn new(store: Arc<dyn ContextStore>) -> Self {
        Self { store }
    }

    /// Memory Bank backed by an [`InMemoryContextStore`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryContextStore::new()))
    }

    pub fn location(&self) -> Option<&Path> {
        self.store.location()
    }

    /// Whether the active context has been written
    pub fn exists(&self) -> bool {
        self.store.exists(MemorySection::Active)
    }

    /// Seed all three documents for a new goal.
    pub fn initialize(&self, goal: &str, project_info: &str) -> Result<(), MemoryBankError> {
        info!(goal = %goal, "Initializing Memory Bank");
        self.store.write(
            MemorySection::Product,
            &MemoryTemplates::product_context(goal, project_info),
        )?;
        self.store.write(
            MemorySection::Active,
            &active_context_document(MemoryTemplates::initial_active_body(), Utc::now()),
        )?;
        self.store
            .write(MemorySection::Patterns, MemoryTemplates::system_patterns())?;
        Ok(())
    }

    /// All present documents under their headers.
    ///
    /// When the combined text exceeds `max_chars` a warning banner is
    /// prepended; nothing is cut.
    pub fn read_context(&self, max_chars: usize) -> Result<String, MemoryBankError> {
        Ok(compose_context(&self.sections()?, Some(max_chars)))
    }

    /// All present documents, never with a banner
    pub fn read_full_context(&self) -> Result<String, MemoryBankError> {
        Ok(compose_context(&self.sections()?, None))
    }

    /// The active context document, or an empty string when missing
    pub fn read_active_context(&self) -> Result<String, MemoryBankError> {
        Ok(self
            .store
            .read(MemorySection::Active)?
            .unwrap_or_default())
    }

    /// Overwrite the active context with `content` under a fresh header.
    pub fn update_active_context(&self, content: &str) -> Result<(), MemoryBankError> {
        self.store.write(
            MemorySection::Active,
            &active_context_document(content, Utc::now()),
        )?;
        Ok(())
    }

    /// Replace the body of `## {section}` in the active context, or add the
    /// section at the end.
    pub fn append_to_active_context(
        &self,
        section: &str,
        content: &str,
    ) -> Result<(), MemoryBankError> {
        let current = self.read_active_context()?;
        self.store.write(
            MemorySection::Active,
            &replace_or_append_section(&current, section, content),
        )?;
        Ok(())
    }

    /// Append a `## {name}` block to the system patterns.
    pub fn append_pattern(&self, name: &str, content: &str) -> Result<(), MemoryBankError> {
        let current = self
            .store
            .read(MemorySection::Patterns)?
            .unwrap_or_default();
        self.store.write(
            MemorySection::Patterns,
            &format!("{current}\n\n## {name}\n{content}"),
        )?;
        Ok(())
    }

    /// Rewrite only the `## Current State` block of the active context.
    pub fn update_status(
        &self,
        status: &str,
        phase: &str,
        iteration: Option<usize>,
    ) -> Result<(), MemoryBankError> {
        let current = self.read_active_context()?;
        self.store.write(
            MemorySection::Active,
            &replace_current_state(&current, status, phase, iteration),
        )?;
        Ok(())
    }

    /// Summarize the whole context with `summarizer` and make the summary the
    /// new active context.
    ///
    /// A failed summarizer call leaves every document untouched.
    pub async fn compact(
        &self,
        summarizer: &dyn Backend,
        options: &BackendOptions,
    ) -> Result<CompactionOutcome, MemoryBankError> {
        let context = self.read_full_context()?;
        let before_chars = context.chars().count();
        debug!(chars = before_chars, backend = summarizer.name(), "Compacting Memory Bank");

        let result = summarizer
            .run(&WorkflowPromptTemplate::compaction_prompt(&context), options)
            .await;

        if !result.is_success() {
            let reason = result
                .error()
                .unwrap_or("summarizer returned no content")
                .to_string();
            warn!(backend = summarizer.name(), reason = %reason, "Compaction skipped");
            return Ok(CompactionOutcome::Skipped { reason });
        }

        self.update_active_context(result.content())?;
        let after_chars = self.read_full_context()?.chars().count();
        info!(before_chars, after_chars, "Memory Bank compacted");
        Ok(CompactionOutcome::Compacted {
            before_chars,
            after_chars,
        })
    }

    /// Delete all three documents.
    pub fn clear(&self) -> Result<(), MemoryBankError> {
        self.store.clear()?;
        Ok(())
    }

    fn sections(&self) -> Result<Vec<(MemorySection, String)>, MemoryBankError> {
        let mut sections = Vec::new();
        for section in MemorySection::ALL {
            if let Some(body) = self.store.read(section)? {
                sections.push((section, body));
            }
        }
        Ok(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::agent::test_support::*;

    #[test]
    fn test_initialize_then_read_context_contains_goal() {
        let bank = MemoryBank::in_memory();
        assert!(!bank.exists());

        bank.initialize("Build a REST API", "axum").unwrap();
        assert!(bank.exists());

        let ctx = bank.read_context(50_000).unwrap();
        assert!(ctx.contains("Build a REST API"));
        assert!(ctx.starts_with("=== PRODUCT CONTEXT ==="));
        assert!(ctx.contains("=== ACTIVE CONTEXT ==="));
        assert!(ctx.contains("=== SYSTEM PATTERNS ==="));
        assert!(!ctx.contains("[WARNING"));
    }

    #[test]
    fn test_read_context_banner_when_oversize() {
        let bank = MemoryBank::in_memory();
        bank.initialize("goal", "").unwrap();
        let full = bank.read_full_context().unwrap();

        let ctx = bank.read_context(10).unwrap();
        assert!(ctx.starts_with("[WARNING: Context exceeds 10 chars. Consider compacting.]"));
        assert!(ctx.ends_with(&full));
    }

    fn last_updated(active: &str) -> chrono::DateTime<chrono::FixedOffset> {
        let stamp = active
            .strip_prefix("# Active Context\n_Last updated: ")
            .and_then(|rest| rest.split_once("_\n"))
            .map(|(stamp, _)| stamp)
            .unwrap();
        chrono::DateTime::parse_from_rfc3339(stamp).unwrap()
    }

    #[test]
    fn test_update_active_context_adds_fresh_header() {
        let bank = MemoryBank::in_memory();
        bank.update_active_context("X marks the spot").unwrap();
        let first = bank.read_active_context().unwrap();

        // stamps have whole-second precision
        std::thread::sleep(std::time::Duration::from_millis(1100));
        bank.update_active_context("Y marks the spot").unwrap();
        let second = bank.read_active_context().unwrap();

        assert!(second.contains("Y marks the spot"));
        assert!(!second.contains("X marks the spot"));
        assert_eq!(second.matches("_Last updated: ").count(), 1);
        assert!(last_updated(&second) > last_updated(&first));
    }

    #[test]
    fn test_read_active_context_missing_is_empty() {
        let bank = MemoryBank::in_memory();
        assert_eq!(bank.read_active_context().unwrap(), "");
        assert_eq!(bank.read_context(100).unwrap(), "");
    }

    #[test]
    fn test_append_to_active_context_replaces_section() {
        let bank = MemoryBank::in_memory();
        bank.initialize("goal", "").unwrap();
        bank.append_to_active_context("Recent Progress", "- API designed")
            .unwrap();

        let active = bank.read_active_context().unwrap();
        assert!(active.contains("## Recent Progress\n- API designed\n\n## Blockers"));
        assert!(!active.contains("(Empty - just started)"));
    }

    #[test]
    fn test_update_status_rewrites_current_state() {
        let bank = MemoryBank::in_memory();
        bank.initialize("goal", "").unwrap();
        bank.update_status("CODING", "Implementing core", Some(1))
            .unwrap();

        let active = bank.read_active_context().unwrap();
        assert!(active.contains("- Status: CODING\n- Phase: Implementing core\n- Iteration: 1"));
        assert!(!active.contains("INITIALIZED"));
        assert!(active.contains("## What We're Working On"));
    }

    #[test]
    fn test_append_pattern() {
        let bank = MemoryBank::in_memory();
        bank.initialize("goal", "").unwrap();
        bank.append_pattern("Hexagonal", "Ports in application").unwrap();

        let ctx = bank.read_full_context().unwrap();
        assert!(ctx.ends_with("## Hexagonal\nPorts in application"));
    }

    #[test]
    fn test_clear_removes_everything() {
        let bank = MemoryBank::in_memory();
        bank.initialize("goal", "").unwrap();
        bank.clear().unwrap();
        assert!(!bank.exists());
        assert_eq!(bank.read_full_context().unwrap(), "");
    }

    #[tokio::test]
    async fn test_compact_replaces_active_context() {
        let bank = MemoryBank::in_memory();
        bank.initialize("goal", "").unwrap();
        let summarizer = ScriptedBackend::new("mock", vec![text("Short summary")]);

        let outcome = bank
            .compact(&summarizer, &BackendOptions::default())
            .await
            .unwrap();
        assert!(outcome.is_compacted());
        assert!(summarizer.prompt(0).contains("=== PRODUCT CONTEXT ==="));
        assert!(summarizer.prompt(0).starts_with("Summarize this context"));

        let active = bank.read_active_context().unwrap();
        assert!(active.starts_with("# Active Context"));
        assert!(active.ends_with("Short summary"));
    }

    #[tokio::test]
    async fn test_compact_skipped_on_summarizer_failure() {
        let bank = MemoryBank::in_memory();
        bank.initialize("goal", "").unwrap();
        let before = bank.read_active_context().unwrap();
        let summarizer = ScriptedBackend::new("mock", vec![error("rate limited")]);

        let outcome = bank
            .compact(&summarizer, &BackendOptions::default())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CompactionOutcome::Skipped {
                reason: "rate limited".to_string()
            }
        );
        assert_eq!(bank.read_active_context().unwrap(), before);
    }
}
