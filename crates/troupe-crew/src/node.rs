//! Agent nodes of a crew graph.

use std::fmt;

use troupe_agent::{ReactAgent, ToolRegistry};
use troupe_llm::SharedBackend;

/// Handle to a node inside one particular [`Crew`](crate::Crew).
///
/// Handles carry the id of the crew that issued them, so a handle from
/// another crew is rejected instead of silently aliasing a local node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) crew: u64,
    pub(crate) index: usize,
}

impl NodeId {
    /// Position of the node in registration order.
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// One or many node handles, for wiring calls.
pub trait IntoNodeIds {
    fn into_node_ids(self) -> Vec<NodeId>;
}

impl IntoNodeIds for NodeId {
    fn into_node_ids(self) -> Vec<NodeId> {
        vec![self]
    }
}

impl IntoNodeIds for Vec<NodeId> {
    fn into_node_ids(self) -> Vec<NodeId> {
        self
    }
}

impl IntoNodeIds for &[NodeId] {
    fn into_node_ids(self) -> Vec<NodeId> {
        self.to_vec()
    }
}

impl<const N: usize> IntoNodeIds for [NodeId; N] {
    fn into_node_ids(self) -> Vec<NodeId> {
        self.to_vec()
    }
}

/// Settings a node falls back to when it has no override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Model used by nodes without their own.
    pub default_model: String,
    /// Bound on each node's reasoning rounds.
    pub max_rounds: u32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            default_model: troupe_llm::DEFAULT_GROQ_MODEL.to_string(),
            max_rounds: troupe_agent::DEFAULT_MAX_ROUNDS,
        }
    }
}

/// A unit of work in a crew.
///
/// Edges and context are managed by the owning crew; a node on its own only
/// knows how to describe its task.
#[derive(Debug, Clone)]
pub struct AgentNode {
    name: String,
    backstory: String,
    task_description: String,
    expected_output: String,
    model: Option<String>,
    tools: ToolRegistry,
    pub(crate) dependencies: Vec<NodeId>,
    pub(crate) dependents: Vec<NodeId>,
    pub(crate) context: String,
}

impl AgentNode {
    /// Create a node with no tools and no expected output.
    pub fn new(
        name: impl Into<String>,
        backstory: impl Into<String>,
        task_description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            backstory: backstory.into(),
            task_description: task_description.into(),
            expected_output: String::new(),
            model: None,
            tools: ToolRegistry::new(),
            dependencies: Vec::new(),
            dependents: Vec::new(),
            context: String::new(),
        }
    }

    /// Describe the shape of the expected answer.
    pub fn with_expected_output(mut self, expected_output: impl Into<String>) -> Self {
        self.expected_output = expected_output.into();
        self
    }

    /// Give the node tools.
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Use a specific model for this node.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backstory(&self) -> &str {
        &self.backstory
    }

    pub fn task_description(&self) -> &str {
        &self.task_description
    }

    pub fn expected_output(&self) -> &str {
        &self.expected_output
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Nodes this node waits on.
    pub fn dependencies(&self) -> &[NodeId] {
        &self.dependencies
    }

    /// Nodes that receive this node's output.
    pub fn dependents(&self) -> &[NodeId] {
        &self.dependents
    }

    /// Everything received from producers so far.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Append a producer's output to the context.
    pub fn receive_context(&mut self, producer: &str, text: &str) {
        self.context
            .push_str(&format!("{} received context from {}: \n{}\n", self.name, producer, text));
    }

    /// The user message sent to this node's reasoning loop.
    pub fn build_prompt(&self) -> String {
        format!(
            "You are an AI agent. You are part of a team of agents working together to complete a task.\n\
I'm going to give you the task description enclosed in <task_description></task_description> tags. I'll also give\n\
you the available context from the other agents in <context></context> tags. If the context\n\
is not available, the <context></context> tags will be empty. You'll also receive the task\n\
expected output enclosed in <task_expected_output></task_expected_output> tags. With all this information\n\
you need to create the best possible response, always respecting the format as described in\n\
<task_expected_output></task_expected_output> tags. If expected output is not available, just create\n\
a meaningful response to complete the task.\n\
\n\
<task_description>\n{}\n</task_description>\n\
\n\
<task_expected_output>\n{}\n</task_expected_output>\n\
\n\
<context>\n{}\n</context>\n\
\n\
Your response:",
            self.task_description, self.expected_output, self.context
        )
    }

    /// The reasoning loop this node runs.
    pub fn reasoner(&self, backend: SharedBackend, settings: &RunSettings) -> ReactAgent {
        ReactAgent::new(backend)
            .with_backstory(self.backstory.clone())
            .with_tools(self.tools.clone())
            .with_model(self.model.as_deref().unwrap_or(&settings.default_model))
            .with_max_rounds(settings.max_rounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receive_context_appends() {
        let mut node = AgentNode::new("editor", "", "Edit the draft");
        node.receive_context("writer", "first draft");
        node.receive_context("critic", "too long");

        assert!(node.context().starts_with("editor received context from writer: \nfirst draft\n"));
        assert!(node.context().ends_with("editor received context from critic: \ntoo long\n"));
    }

    #[test]
    fn test_build_prompt_layout() {
        let mut node = AgentNode::new("poet", "You are a poet.", "Write a haiku")
            .with_expected_output("Three lines");
        node.receive_context("muse", "autumn");

        let prompt = node.build_prompt();
        assert!(prompt.starts_with("You are an AI agent."));
        assert!(prompt.contains("<task_description>\nWrite a haiku\n</task_description>"));
        assert!(prompt.contains("<task_expected_output>\nThree lines\n</task_expected_output>"));
        assert!(prompt.contains("<context>\npoet received context from muse: \nautumn\n\n</context>"));
        assert!(prompt.ends_with("Your response:"));

        // No side effects.
        assert_eq!(prompt, node.build_prompt());
    }

    #[test]
    fn test_empty_context_prompt() {
        let node = AgentNode::new("a", "", "task");
        assert!(node.build_prompt().contains("<context>\n\n</context>"));
    }

    #[test]
    fn test_reasoner_model_override() {
        let backend: SharedBackend = std::sync::Arc::new(troupe_llm::MockBackend::new(vec![]));
        let settings = RunSettings::default();

        let default_node = AgentNode::new("a", "", "t");
        assert_eq!(
            default_node.reasoner(backend.clone(), &settings).model(),
            troupe_llm::DEFAULT_GROQ_MODEL
        );

        let custom = AgentNode::new("b", "", "t").with_model("llama-3.1-8b-instant");
        assert_eq!(custom.reasoner(backend, &settings).model(), "llama-3.1-8b-instant");
    }
}
