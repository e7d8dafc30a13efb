//! Agent core for Troupe.
//!
//! This crate turns a completion backend into agents that can call tools:
//! it parses tagged model output, validates tool calls against typed
//! signatures and runs the reasoning loops.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  ToolAgent / ReactAgent / ReflectionAgent                │
//! │  - build prompts, call the backend, parse tagged output  │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┼────────────────┐
//!              ▼               ▼                ▼
//!       ┌────────────┐  ┌──────────────┐  ┌─────────────┐
//!       │ LlmBackend │  │ ToolRegistry │  │ ChatHistory │
//!       │(troupe-llm)│  │  + validate  │  │(troupe-llm) │
//!       └────────────┘  └──────────────┘  └─────────────┘
//! ```
//!
//! # Core Components
//!
//! - [`extract_tag_content`]: pull `<tag>…</tag>` blocks out of model text
//! - [`validate`]: coerce a [`RawToolCall`] to a tool's [`ToolSignature`]
//! - [`ToolAgent`]: one round of tool calls followed by an answer
//! - [`ReactAgent`]: bounded thought / tool call / observation loop
//! - [`ReflectionAgent`]: generate and critique until accepted

pub mod error;
pub mod extraction;
pub mod prompt;
pub mod react;
pub mod reflection;
pub mod tool;
pub mod tool_agent;

pub use error::{AgentError, ArgumentError, Result};
pub use extraction::{TagContent, extract_tag_content};
pub use prompt::{PromptMode, SystemPromptBuilder};
pub use react::{DEFAULT_MAX_ROUNDS, ReactAgent};
pub use reflection::{
    DEFAULT_HISTORY_CAPACITY, DEFAULT_REFLECTION_STEPS, ReflectionAgent, ReflectionOutcome,
};
pub use tool::{
    ArgType, ArgValue, FnTool, FnToolBuilder, RawToolCall, Tool, ToolArgs, ToolParameter,
    ToolRegistry, ToolResult, ToolSignature, ValidatedCall, validate,
};
pub use tool_agent::{Observation, ToolAgent, ToolRun, format_observations, process_tool_calls};
