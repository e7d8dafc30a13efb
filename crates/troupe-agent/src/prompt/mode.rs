//! Prompt mode definitions.
//!
//! The mode decides which answering protocol the system prompt teaches.

use serde::{Deserialize, Serialize};

/// Protocol the model is asked to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptMode {
    /// Single round of function calling: reply with `<tool_call>` blocks only.
    #[default]
    ToolCalling,

    /// Thought / action / observation loop ending in a `<response>` block.
    React,
}

impl PromptMode {
    /// Whether the protocol includes an explicit final `<response>` tag.
    pub fn expects_response_tag(&self) -> bool {
        matches!(self, Self::React)
    }
}
