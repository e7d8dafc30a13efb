//! Tagged-content extraction from model output.
//!
//! Models are prompted to wrap structured parts of their reply in XML-like
//! tags (`<tool_call>`, `<thought>`, `<response>`). This module pulls those
//! blocks back out.

use regex::Regex;

/// The blocks found for one tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagContent {
    /// Trimmed contents of every `<tag>…</tag>` block, in order of appearance.
    pub content: Vec<String>,
    /// Whether at least one block was found.
    pub found: bool,
}

impl TagContent {
    /// The first block, if any.
    pub fn first(&self) -> Option<&str> {
        self.content.first().map(String::as_str)
    }
}

/// Extract the contents of every `<tag>…</tag>` block in `text`.
///
/// Matching is non-greedy and spans newlines, so two adjacent blocks yield
/// two entries. Unclosed tags are ignored.
pub fn extract_tag_content(text: &str, tag: &str) -> TagContent {
    let tag = regex::escape(tag);
    let pattern = format!(r"(?s)<{tag}>(.*?)</{tag}>");

    let Ok(re) = Regex::new(&pattern) else {
        return TagContent::default();
    };

    let content: Vec<String> = re
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect();

    TagContent {
        found: !content.is_empty(),
        content,
    }
}
