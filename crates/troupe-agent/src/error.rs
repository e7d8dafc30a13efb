//! Error types for the agent crate.

use thiserror::Error;

use crate::tool::ArgType;

/// Result type alias using the agent error type.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Error type for agent operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The completion call failed.
    #[error("Completion failed: {0}")]
    Completion(#[from] troupe_llm::LlmError),

    /// Tool not found in registry.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// A tool call argument did not match the declared signature.
    #[error("Invalid tool arguments: {0}")]
    Argument(#[from] ArgumentError),

    /// A `<tool_call>` block could not be decoded.
    #[error("Malformed tool call: {0}")]
    MalformedToolCall(String),

    /// A tool signature was rejected when building or registering a tool.
    #[error("Invalid tool signature: {0}")]
    InvalidSignature(String),

    /// The tool callable itself failed.
    #[error("Tool error: {0}")]
    Tool(String),

    /// Maximum iterations exceeded.
    #[error("Maximum iterations exceeded: {0}")]
    MaxIterations(u32),
}

impl AgentError {
    /// Create a tool error.
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::Tool(msg.into())
    }

    /// Create a malformed tool call error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedToolCall(msg.into())
    }

    /// Create an invalid signature error.
    pub fn invalid_signature(msg: impl Into<String>) -> Self {
        Self::InvalidSignature(msg.into())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Argument Validation Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Error produced when validating a tool call against its signature.
///
/// Messages name the tool and the argument so the model can correct itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgumentError {
    /// The call passed an argument the signature does not declare.
    #[error("tool '{tool}' has no parameter named '{argument}'")]
    Unknown {
        /// The tool name.
        tool: String,
        /// The undeclared argument.
        argument: String,
    },

    /// A declared argument was not supplied.
    #[error("tool '{tool}' is missing required argument '{argument}'")]
    Missing {
        /// The tool name.
        tool: String,
        /// The missing argument.
        argument: String,
    },

    /// The value could not be coerced to the declared type.
    #[error("tool '{tool}' argument '{argument}': cannot convert {value} to {expected}")]
    Type {
        /// The tool name.
        tool: String,
        /// The argument name.
        argument: String,
        /// The declared type.
        expected: ArgType,
        /// The offending value, rendered as JSON.
        value: String,
    },
}

impl ArgumentError {
    /// Get the argument name associated with this error.
    pub fn argument(&self) -> &str {
        match self {
            Self::Unknown { argument, .. }
            | Self::Missing { argument, .. }
            | Self::Type { argument, .. } => argument,
        }
    }
}
