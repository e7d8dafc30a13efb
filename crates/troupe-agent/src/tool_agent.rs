//! Single-round tool calling.
//!
//! [`ToolAgent`] asks the model which tools to call, runs them, and asks the
//! model again for a final answer with the results in view:
//!
//! ```text
//! awaiting tool decision ──(≥1 <tool_call>)──► dispatching ──► awaiting final answer
//!          │                                                          ▲
//!          └──────────────────(no <tool_call>)────────────────────────┘
//! ```

use std::fmt::Write as _;

use serde_json::Value;
use troupe_llm::{ChatHistory, DEFAULT_GROQ_MODEL, Message, SharedBackend};

use crate::error::Result;
use crate::extraction::extract_tag_content;
use crate::prompt::{PromptMode, SystemPromptBuilder};
use crate::tool::{RawToolCall, ToolRegistry, ToolResult, ValidatedCall};

// ─────────────────────────────────────────────────────────────────────────────
// Observations
// ─────────────────────────────────────────────────────────────────────────────

/// The outcome of one dispatched tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Position of the call within its batch. Results are keyed by this.
    pub index: usize,
    /// The validated call that was executed.
    pub call: ValidatedCall,
    /// What the tool returned.
    pub result: ToolResult,
}

/// Decode, validate and run every `<tool_call>` block in order.
///
/// The first failure aborts the batch; earlier results are discarded.
pub async fn process_tool_calls(
    registry: &ToolRegistry,
    blocks: &[String],
) -> Result<Vec<Observation>> {
    let mut observations = Vec::with_capacity(blocks.len());

    for (index, block) in blocks.iter().enumerate() {
        let raw = RawToolCall::parse(block)?;
        tracing::info!(tool = %raw.name, index, "Using tool");

        let (call, result) = registry.dispatch(&raw).await.inspect_err(|e| {
            tracing::warn!(tool = %raw.name, index, error = %e, "Tool call failed");
        })?;
        tracing::debug!(tool = %call.name, index, result = %result, "Tool result");

        observations.push(Observation {
            index,
            call,
            result,
        });
    }

    Ok(observations)
}

/// Render results as the user message fed back to the model.
///
/// ```text
/// Observation: {"0": 5, "1": "four words in here"}
/// ```
pub fn format_observations(observations: &[Observation]) -> String {
    let mut out = String::from("Observation: {");
    for (i, obs) in observations.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let value: Value = obs.result.to_value();
        let _ = write!(out, "\"{}\": {}", obs.index, value);
    }
    out.push('}');
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool Agent
// ─────────────────────────────────────────────────────────────────────────────

/// Answer and the tool results that informed it.
#[derive(Debug, Clone)]
pub struct ToolRun {
    pub answer: String,
    pub observations: Vec<Observation>,
}

/// Agent that performs one round of tool calls before answering.
pub struct ToolAgent {
    backend: SharedBackend,
    tools: ToolRegistry,
    model: String,
}

impl ToolAgent {
    /// Create a tool agent using the default model.
    pub fn new(backend: SharedBackend, tools: ToolRegistry) -> Self {
        Self {
            backend,
            tools,
            model: DEFAULT_GROQ_MODEL.to_string(),
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Get the tool registry.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// The system prompt carrying the tool catalog.
    pub fn system_prompt(&self) -> String {
        SystemPromptBuilder::new()
            .with_mode(PromptMode::ToolCalling)
            .with_tools(&self.tools)
            .build()
    }

    /// Run the round and return only the answer.
    pub async fn run(&self, user_msg: &str) -> Result<String> {
        Ok(self.run_detailed(user_msg).await?.answer)
    }

    /// Run the round, returning the answer with the tool observations.
    ///
    /// The tool-decision conversation sees the catalog; the answering
    /// conversation only sees the user message and the observations.
    pub async fn run_detailed(&self, user_msg: &str) -> Result<ToolRun> {
        let user = Message::user(user_msg);
        let tool_history = ChatHistory::new(vec![Message::system(self.system_prompt()), user.clone()]);
        let mut agent_history = ChatHistory::new(vec![user]);

        tracing::debug!(
            model = %self.model,
            tools = self.tools.len(),
            phase = "awaiting_tool_decision",
            "Asking for tool calls"
        );
        let decision = self
            .backend
            .complete_text(tool_history.messages(), &self.model)
            .await?;

        let calls = extract_tag_content(&decision, "tool_call");
        let observations = if calls.found {
            tracing::debug!(calls = calls.content.len(), phase = "dispatching", "Dispatching tool calls");
            let observations = process_tool_calls(&self.tools, &calls.content).await?;
            agent_history.push(Message::user(format_observations(&observations)));
            observations
        } else {
            tracing::debug!("No tool calls requested");
            Vec::new()
        };

        tracing::debug!(phase = "awaiting_final_answer", "Asking for final answer");
        let answer = self
            .backend
            .complete_text(agent_history.messages(), &self.model)
            .await?;

        Ok(ToolRun {
            answer,
            observations,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
