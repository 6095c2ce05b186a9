//! Markdown section patching and context composition

use super::section::MemorySection;
use super::templates::MemoryTemplates;
use chrono::{DateTime, Utc};

/// Warning prepended to an over-long combined context
pub fn oversize_banner(max_chars: usize) -> String {
    format!("[WARNING: Context exceeds {max_chars} chars. Consider compacting.]")
}

/// Join the present sections under their headers, separated by blank lines.
///
/// When the result is longer than `max_chars` characters the oversize
/// banner is prepended. Content is never truncated.
pub fn compose_context(sections: &[(MemorySection, String)], max_chars: Option<usize>) -> String {
    let content = sections
        .iter()
        .map(|(section, body)| format!("{}\n{}", section.context_header(), body))
        .collect::<Vec<_>>()
        .join("\n\n");

    match max_chars {
        Some(max) if content.chars().count() > max => {
            format!("{}\n\n{}", oversize_banner(max), content)
        }
        _ => content,
    }
}

/// Full active-context document: stamped header followed by `body`
pub fn active_context_document(body: &str, at: DateTime<Utc>) -> String {
    format!("{}{}", MemoryTemplates::active_header(at), body)
}

/// Replace the body of `## {section}` up to the next `## ` heading, or
/// append a new `## {section}` block at the end when it is missing.
pub fn replace_or_append_section(document: &str, section: &str, content: &str) -> String {
    let heading = format!("## {section}");
    let lines: Vec<&str> = document.split('\n').collect();

    let Some(start) = lines.iter().position(|l| l.trim_end() == heading) else {
        let mut out = document.trim_end_matches('\n').to_string();
        out.push_str(&format!("\n\n{heading}\n{content}\n"));
        return out;
    };

    let end = lines[start + 1..]
        .iter()
        .position(|l| l.starts_with("## "))
        .map(|offset| start + 1 + offset);

    let mut out: Vec<String> = lines[..=start].iter().map(|l| l.to_string()).collect();
    out.push(content.trim_end_matches('\n').to_string());
    match end {
        Some(end) => {
            out.push(String::new());
            out.extend(lines[end..].iter().map(|l| l.to_string()));
        }
        None => out.push(String::new()),
    }
    out.join("\n")
}

/// Swap the `## Current State` block for a fresh one.
///
/// When no such block exists it is inserted before the first `## `
/// heading, or appended when the document has none.
pub fn replace_current_state(
    document: &str,
    status: &str,
    phase: &str,
    iteration: Option<usize>,
) -> String {
    let block = MemoryTemplates::current_state(status, phase, iteration);

    if document.lines().any(|l| l.trim_end() == "## Current State") {
        let body = block
            .strip_prefix("## Current State\n")
            .unwrap_or(block.as_str());
        return replace_or_append_section(document, "Current State", body);
    }

    let lines: Vec<&str> = document.split('\n').collect();
    match lines.iter().position(|l| l.starts_with("## ")) {
        Some(i) => {
            let mut out: Vec<String> = lines[..i].iter().map(|l| l.to_string()).collect();
            out.push(block);
            out.push(String::new());
            out.extend(lines[i..].iter().map(|l| l.to_string()));
            out.join("\n")
        }
        None => format!("{}\n\n{}\n", document.trim_end_matches('\n'), block),
    }
}
