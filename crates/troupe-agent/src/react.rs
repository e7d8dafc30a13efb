//! ReAct reasoning loop.
//!
//! The model alternates thoughts and tool calls until it produces a
//! `<response>` block. Each round costs one completion; the number of rounds
//! is bounded.

use troupe_llm::{ChatHistory, DEFAULT_GROQ_MODEL, Message, Role, SharedBackend};

use crate::error::{AgentError, Result};
use crate::extraction::extract_tag_content;
use crate::prompt::{PromptMode, SystemPromptBuilder};
use crate::tool::ToolRegistry;
use crate::tool_agent::{format_observations, process_tool_calls};

/// Default bound on reasoning rounds.
pub const DEFAULT_MAX_ROUNDS: u32 = 10;

/// Agent running a thought / tool call / observation loop.
pub struct ReactAgent {
    backend: SharedBackend,
    tools: ToolRegistry,
    model: String,
    backstory: String,
    max_rounds: u32,
}

impl ReactAgent {
    /// Create an agent with no tools, an empty backstory and the default model.
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            tools: ToolRegistry::new(),
            model: DEFAULT_GROQ_MODEL.to_string(),
            backstory: String::new(),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Set the tools.
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the persona placed at the top of the system prompt.
    pub fn with_backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }

    /// Set the round limit. Values below 1 are raised to 1.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    /// The model this agent calls.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The system prompt for this agent.
    pub fn system_prompt(&self) -> String {
        SystemPromptBuilder::new()
            .with_mode(PromptMode::React)
            .with_backstory(self.backstory.clone())
            .with_tools(&self.tools)
            .build()
    }

    /// Run the loop for one question.
    ///
    /// Returns the first `<response>` block. A reply with neither a response
    /// nor a tool call is taken as the answer verbatim.
    pub async fn run(&self, user_msg: &str) -> Result<String> {
        let mut history = ChatHistory::new(vec![
            Message::system(self.system_prompt()),
            Message::tagged(Role::User, user_msg, "question"),
        ]);

        for round in 1..=self.max_rounds {
            tracing::debug!(round, model = %self.model, "ReAct round");
            let reply = self
                .backend
                .complete_text(history.messages(), &self.model)
                .await?;
            history.push(Message::assistant(reply.clone()));

            let response = extract_tag_content(&reply, "response");
            if let Some(answer) = response.first() {
                tracing::debug!(round, "ReAct loop finished");
                return Ok(answer.to_string());
            }

            let thoughts = extract_tag_content(&reply, "thought");
            for thought in &thoughts.content {
                tracing::debug!(round, %thought, "Thought");
            }

            let calls = extract_tag_content(&reply, "tool_call");
            if calls.found {
                let observations = process_tool_calls(&self.tools, &calls.content).await?;
                history.push(Message::user(format_observations(&observations)));
                continue;
            }

            return Ok(reply.trim().to_string());
        }

        tracing::warn!(max_rounds = self.max_rounds, "ReAct loop exhausted its rounds");
        Err(AgentError::MaxIterations(self.max_rounds))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use troupe_llm::MockBackend;

    use super::*;
    use crate::tool::{ArgType, FnTool, ToolResult};

    fn calculator() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                FnTool::builder("multiply_two_elements")
                    .param("a", ArgType::Float)
                    .param("b", ArgType::Float)
                    .handler(|args| Ok(ToolResult::from(args.float("a")? * args.float("b")?)))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_direct_response() {
        let backend = Arc::new(MockBackend::with_text(
            "<thought>easy</thought><response>Paris</response>",
        ));
        let agent = ReactAgent::new(backend.clone()).with_backstory("You are a geographer.");

        assert_eq!(agent.run("Capital of France?").await.unwrap(), "Paris");

        let request = &backend.requests()[0];
        assert!(request.messages[0].content.starts_with("You are a geographer."));
        assert_eq!(request.messages[1].content, "<question>Capital of France?</question>");
    }

    #[tokio::test]
    async fn test_tool_round_then_response() {
        let backend = Arc::new(MockBackend::with_texts([
            r#"<thought>multiply</thought><tool_call>{"name": "multiply_two_elements", "arguments": {"a": 3, "b": "4"}, "id": 0}</tool_call>"#,
            "<response>12</response>",
        ]));
        let agent = ReactAgent::new(backend.clone()).with_tools(calculator());

        assert_eq!(agent.run("3 times 4?").await.unwrap(), "12");

        let second = &backend.requests()[1].messages;
        assert_eq!(second.len(), 4);
        assert_eq!(second[2].role, Role::Assistant);
        assert_eq!(second[3].content, r#"Observation: {"0": 12.0}"#);
    }

    #[tokio::test]
    async fn test_untagged_reply_is_the_answer() {
        let backend = Arc::new(MockBackend::with_text("  plain answer \n"));
        let agent = ReactAgent::new(backend);
        assert_eq!(agent.run("q").await.unwrap(), "plain answer");
    }

    #[tokio::test]
    async fn test_rounds_exhausted() {
        let call = r#"<tool_call>{"name": "multiply_two_elements", "arguments": {"a": 1, "b": 1}}</tool_call>"#;
        let backend = Arc::new(MockBackend::with_texts([call, call]));
        let agent = ReactAgent::new(backend.clone())
            .with_tools(calculator())
            .with_max_rounds(2);

        let err = agent.run("loop forever").await.unwrap_err();
        assert!(matches!(err, AgentError::MaxIterations(2)));
        assert_eq!(backend.request_count(), 2);
    }

    #[tokio::test]
    async fn test_zero_rounds_still_asks_once() {
        let backend = Arc::new(MockBackend::with_text("<response>hi</response>"));
        let agent = ReactAgent::new(backend.clone()).with_max_rounds(0);

        assert_eq!(agent.run("hello").await.unwrap(), "hi");
        assert_eq!(backend.request_count(), 1);
    }
}
