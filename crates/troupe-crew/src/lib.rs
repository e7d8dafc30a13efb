//! Agent crews: a dependency graph of agents run in topological order.
//!
//! Each agent node runs a ReAct reasoning loop over its task and the context
//! handed down by the agents it depends on. Its answer is appended to the
//! context of every dependent.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Crew                                                   │
//! │  - CrewScope guard for registration                     │
//! │  - Producer / consumer edges between AgentNodes         │
//! │  - Kahn ordering, cycles rejected before any run        │
//! │  - Sequential execution with context fan-out            │
//! └─────────────────────────────────────────────────────────┘
//!          │ per node
//!          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │  ReactAgent (troupe-agent) over a SharedBackend         │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod crew;
pub mod definition;
pub mod error;
pub mod graph;
pub mod node;

pub use crew::{Crew, CrewScope, NodeOutput};
pub use definition::{AgentDefinition, CrewDefinition, CrewFile};
pub use error::{CrewError, Result};
pub use graph::CrewGraph;
pub use node::{AgentNode, IntoNodeIds, NodeId, RunSettings};
