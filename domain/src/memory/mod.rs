//! Memory Bank documents
//!
//! Pure text handling for the three Markdown files that make up a Memory
//! Bank. Reading and writing them is the job of a context store.

pub mod document;
pub mod section;
pub mod templates;

pub use document::{
    active_context_document, compose_context, oversize_banner, replace_current_state,
    replace_or_append_section,
};
pub use section::MemorySection;
pub use templates::MemoryTemplates;
