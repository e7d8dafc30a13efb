//! Error types for crew scheduling.

use thiserror::Error;
use troupe_agent::AgentError;

/// Result type for crew operations.
pub type Result<T> = std::result::Result<T, CrewError>;

/// Errors that can occur while wiring or running a crew.
#[derive(Debug, Error)]
pub enum CrewError {
    /// The dependency graph has a cycle. Holds the agents that could not be ordered.
    #[error("Dependency cycle detected; could not order: {}", .0.join(", "))]
    Cycle(Vec<String>),

    /// An edge refers to a node that does not belong to this crew.
    #[error("Invalid dependency: {0}")]
    InvalidDependency(String),

    /// A registration scope is already open on this crew.
    #[error("Crew '{0}' already has an active scope")]
    ScopeActive(String),

    /// Two agents share a name.
    #[error("Duplicate agent name: {0}")]
    DuplicateAgent(String),

    /// Invalid crew definition.
    #[error("Invalid crew definition: {0}")]
    InvalidDefinition(String),

    /// An agent failed while executing.
    #[error("Agent '{agent}' failed: {source}")]
    Agent {
        /// Name of the failing agent.
        agent: String,
        /// What went wrong.
        #[source]
        source: AgentError,
    },
}

impl CrewError {
    /// Create an invalid definition error.
    pub fn definition(msg: impl Into<String>) -> Self {
        Self::InvalidDefinition(msg.into())
    }
}
