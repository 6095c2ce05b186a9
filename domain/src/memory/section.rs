//! The three Memory Bank files

use serde::{Deserialize, Serialize};

/// One of the three Memory Bank documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemorySection {
    /// The "why": goal, success criteria, constraints
    Product,
    /// The "what": current state, progress, next steps
    Active,
    /// Architectural decisions and lessons learned
    Patterns,
}

impl MemorySection {
    /// All sections in read order
    pub const ALL: [MemorySection; 3] = [
        MemorySection::Product,
        MemorySection::Active,
        MemorySection::Patterns,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            MemorySection::Product => "productContext.md",
            MemorySection::Active => "activeContext.md",
            MemorySection::Patterns => "systemPatterns.md",
        }
    }

    /// Header used when the section is concatenated into a prompt context
    pub fn context_header(&self) -> &'static str {
        match self {
            MemorySection::Product => "=== PRODUCT CONTEXT ===",
            MemorySection::Active => "=== ACTIVE CONTEXT ===",
            MemorySection::Patterns => "=== SYSTEM PATTERNS ===",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MemorySection::Product => "product",
            MemorySection::Active => "active",
            MemorySection::Patterns => "patterns",
        }
    }
}

impl std::fmt::Display for MemorySection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
