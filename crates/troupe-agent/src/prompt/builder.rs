//! System prompt builder implementation.
//!
//! Provides a fluent builder for assembling system prompts from sections.

use crate::tool::ToolRegistry;

use super::mode::PromptMode;

const TOOL_CALLING_PROTOCOL: &str = r#"You are a function calling AI model. You are provided with function signatures within <tools></tools> XML tags.
You may call one or more functions to assist with the user query. Don't make assumptions about what values to plug
into functions. Pay special attention to the declared parameter types and use them exactly.
For each function call return a JSON object with the function name and arguments within <tool_call></tool_call>
XML tags as follows:

<tool_call>
{"name": <function-name>, "arguments": <args-dict>, "id": <monotonically-increasing-id>}
</tool_call>"#;

const REACT_PROTOCOL: &str = r#"You operate by running a loop with the following steps: Thought, Action, Observation.
You are provided with function signatures within <tools></tools> XML tags.
You may call one or more functions to assist with the user query. Don't make assumptions about what values to plug
into functions. Pay special attention to the declared parameter types and use them exactly.
For each function call return a JSON object with the function name and arguments within <tool_call></tool_call>
XML tags as follows:

<tool_call>
{"name": <function-name>, "arguments": <args-dict>, "id": <monotonically-increasing-id>}
</tool_call>

Use your thoughts to reflect on the question, wrapped in <thought></thought> tags.
After a tool call you will receive the results as an Observation message.
When you have the final answer, or when no tool is needed, reply with it inside <response></response> tags.

Example session:

<question>What's the current temperature in Madrid?</question>
<thought>I need to get the current weather in Madrid</thought>
<tool_call>{"name": "get_current_weather", "arguments": {"location": "Madrid", "unit": "celsius"}, "id": 0}</tool_call>

You will be called again with this:

<observation>{"0": {"temperature": 25, "unit": "celsius"}}</observation>

You then output:

<response>The current temperature in Madrid is 25 degrees Celsius</response>"#;

/// Builder for generating system prompts.
///
/// Sections are joined with double newlines.
///
/// # Example
///
/// ```rust,ignore
/// let prompt = SystemPromptBuilder::new()
///     .with_backstory("You are a research assistant.")
///     .with_tools(&registry)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct SystemPromptBuilder {
    mode: PromptMode,
    backstory: Option<String>,
    catalog: Option<String>,
}

impl SystemPromptBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prompt mode.
    pub fn with_mode(mut self, mode: PromptMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the persona text placed before the protocol.
    pub fn with_backstory(mut self, backstory: impl Into<String>) -> Self {
        let backstory = backstory.into();
        if !backstory.trim().is_empty() {
            self.backstory = Some(backstory);
        }
        self
    }

    /// Add the signatures of every tool in a registry.
    pub fn with_tools(mut self, registry: &ToolRegistry) -> Self {
        self.catalog = Some(registry.catalog());
        self
    }

    /// Build the final prompt.
    pub fn build(self) -> String {
        let mut sections: Vec<String> = Vec::new();

        if let Some(backstory) = self.backstory {
            sections.push(backstory.trim().to_string());
        }

        let protocol = match self.mode {
            PromptMode::ToolCalling => TOOL_CALLING_PROTOCOL,
            PromptMode::React => REACT_PROTOCOL,
        };
        sections.push(protocol.to_string());

        let catalog = self.catalog.unwrap_or_default();
        sections.push(format!("Here are the available tools:\n\n<tools>\n{catalog}\n</tools>"));

        sections.join("\n\n")
    }
}
