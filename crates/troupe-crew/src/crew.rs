//! The crew: registration scope, dependency graph and sequential scheduler.
//!
//! ```rust,ignore
//! let mut crew = Crew::new("newsroom");
//! let (writer, editor) = {
//!     let mut scope = crew.activate()?;
//!     let writer = scope.register(AgentNode::new("writer", "", "Draft an article"));
//!     let editor = scope.register(AgentNode::new("editor", "", "Tighten the draft"));
//!     (writer, editor)
//! };
//! crew.connect(writer, editor)?;
//! let outputs = crew.run(&backend).await?;
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::Instrument;
use troupe_llm::SharedBackend;
use uuid::Uuid;

use crate::error::{CrewError, Result};
use crate::graph::CrewGraph;
use crate::node::{AgentNode, IntoNodeIds, NodeId, RunSettings};

static NEXT_CREW_ID: AtomicU64 = AtomicU64::new(1);

/// Output of one node during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOutput {
    pub id: NodeId,
    pub agent: String,
    pub output: String,
}

/// A group of agent nodes and the edges between them.
///
/// Nodes are owned by the crew and addressed by [`NodeId`]. Registration only
/// happens through a [`CrewScope`].
#[derive(Debug)]
pub struct Crew {
    id: u64,
    name: String,
    nodes: Vec<AgentNode>,
    active: bool,
    settings: RunSettings,
}

impl Crew {
    /// Create an empty crew.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NEXT_CREW_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            nodes: Vec::new(),
            active: false,
            settings: RunSettings::default(),
        }
    }

    /// Replace the run settings.
    pub fn with_settings(mut self, settings: RunSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Whether a scope is currently open.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Open the registration scope.
    ///
    /// The scope closes when the returned guard is dropped, on every exit
    /// path. Fails if a scope is already open.
    pub fn activate(&mut self) -> Result<CrewScope<'_>> {
        if self.active {
            return Err(CrewError::ScopeActive(self.name.clone()));
        }
        self.active = true;
        tracing::debug!(crew = %self.name, "Crew scope opened");
        Ok(CrewScope { crew: self })
    }

    /// Register a node if a scope is open.
    ///
    /// Returns `None` and drops the node when no scope is active.
    pub fn register(&mut self, node: AgentNode) -> Option<NodeId> {
        if !self.active {
            tracing::debug!(crew = %self.name, agent = %node.name(), "No active scope, node ignored");
            return None;
        }
        Some(self.push_node(node))
    }

    fn push_node(&mut self, node: AgentNode) -> NodeId {
        let id = NodeId {
            crew: self.id,
            index: self.nodes.len(),
        };
        tracing::debug!(crew = %self.name, agent = %node.name(), %id, "Agent registered");
        self.nodes.push(node);
        id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a node.
    pub fn node(&self, id: NodeId) -> Result<&AgentNode> {
        self.check(id)?;
        Ok(&self.nodes[id.index])
    }

    /// All nodes in registration order.
    pub fn nodes(&self) -> &[AgentNode] {
        &self.nodes
    }

    /// Handles of all nodes in registration order.
    pub fn ids(&self) -> Vec<NodeId> {
        (0..self.nodes.len())
            .map(|index| NodeId {
                crew: self.id,
                index,
            })
            .collect()
    }

    /// Find the first node with a name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name() == name)
            .map(|index| NodeId {
                crew: self.id,
                index,
            })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if id.crew != self.id || id.index >= self.nodes.len() {
            return Err(CrewError::InvalidDependency(format!(
                "node {id} does not belong to crew '{}'",
                self.name
            )));
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Wiring
    // ─────────────────────────────────────────────────────────────────────────

    /// Make `consumer` wait on `producer`.
    pub fn connect(&mut self, producer: NodeId, consumer: NodeId) -> Result<&mut Self> {
        self.add_dependency(consumer, producer)
    }

    /// Make `node` wait on each of `dependencies`.
    ///
    /// Both directions of every edge are recorded; repeated edges are
    /// ignored. Nothing changes if any handle is invalid.
    pub fn add_dependency(
        &mut self,
        node: NodeId,
        dependencies: impl IntoNodeIds,
    ) -> Result<&mut Self> {
        let dependencies = dependencies.into_node_ids();
        self.check(node)?;
        for &dep in &dependencies {
            self.check(dep)?;
        }
        for dep in dependencies {
            self.link(dep, node);
        }
        Ok(self)
    }

    /// Make each of `dependents` wait on `node`.
    pub fn add_dependent(&mut self, node: NodeId, dependents: impl IntoNodeIds) -> Result<&mut Self> {
        let dependents = dependents.into_node_ids();
        self.check(node)?;
        for &dependent in &dependents {
            self.check(dependent)?;
        }
        for dependent in dependents {
            self.link(node, dependent);
        }
        Ok(self)
    }

    fn link(&mut self, producer: NodeId, consumer: NodeId) {
        if self.nodes[consumer.index].dependencies.contains(&producer) {
            return;
        }
        self.nodes[consumer.index].dependencies.push(producer);
        self.nodes[producer.index].dependents.push(consumer);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scheduling
    // ─────────────────────────────────────────────────────────────────────────

    /// Order nodes so every node comes after its dependencies.
    ///
    /// Kahn's algorithm with a FIFO queue seeded in registration order, so
    /// the result is deterministic.
    pub fn topological_order(&self) -> Result<Vec<NodeId>> {
        let ids = self.ids();
        let mut in_degree: Vec<usize> = self.nodes.iter().map(|n| n.dependencies.len()).collect();
        let mut queue: VecDeque<NodeId> = ids
            .iter()
            .copied()
            .filter(|id| in_degree[id.index] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(id) = queue.pop_front() {
            order.push(id);
            for &dependent in &self.nodes[id.index].dependents {
                in_degree[dependent.index] -= 1;
                if in_degree[dependent.index] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if order.len() != self.nodes.len() {
            let stuck = ids
                .iter()
                .filter(|id| !order.contains(id))
                .map(|id| self.nodes[id.index].name().to_string())
                .collect();
            return Err(CrewError::Cycle(stuck));
        }

        Ok(order)
    }

    /// Run one node and pass its output to its dependents.
    ///
    /// Dependents only receive context when the node succeeds.
    pub async fn execute(&mut self, id: NodeId, backend: &SharedBackend) -> Result<String> {
        let node = self.node(id)?;
        let name = node.name().to_string();
        let prompt = node.build_prompt();
        let reasoner = node.reasoner(backend.clone(), &self.settings);

        tracing::info!(agent = %name, model = %reasoner.model(), "Running agent");
        let output = reasoner
            .run(&prompt)
            .await
            .map_err(|source| CrewError::Agent {
                agent: name.clone(),
                source,
            })?;

        let dependents = self.nodes[id.index].dependents.clone();
        for dependent in dependents {
            self.nodes[dependent.index].receive_context(&name, &output);
        }
        tracing::debug!(agent = %name, output_len = output.len(), "Agent finished");

        Ok(output)
    }

    /// Run every node in topological order.
    ///
    /// A cycle fails the run before any node executes.
    pub async fn run(&mut self, backend: &SharedBackend) -> Result<Vec<NodeOutput>> {
        let order = self.topological_order()?;
        let span = tracing::info_span!("crew_run", crew = %self.name, run_id = %Uuid::new_v4());
        self.run_in_order(order, backend).instrument(span).await
    }

    async fn run_in_order(
        &mut self,
        order: Vec<NodeId>,
        backend: &SharedBackend,
    ) -> Result<Vec<NodeOutput>> {
        tracing::info!(agents = order.len(), "Crew run started");
        let mut outputs = Vec::with_capacity(order.len());
        for id in order {
            let output = self.execute(id, backend).await?;
            outputs.push(NodeOutput {
                id,
                agent: self.nodes[id.index].name().to_string(),
                output,
            });
        }
        tracing::info!(agents = outputs.len(), "Crew run finished");
        Ok(outputs)
    }

    /// One vertex per node and one edge per dependency.
    pub fn render(&self) -> CrewGraph {
        let mut graph = CrewGraph::new(self.name.clone());
        for node in &self.nodes {
            graph.vertices.push(node.name().to_string());
            for &dep in &node.dependencies {
                graph
                    .edges
                    .push((self.nodes[dep.index].name().to_string(), node.name().to_string()));
            }
        }
        graph
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scope Guard
// ─────────────────────────────────────────────────────────────────────────────

/// An open registration scope. Dropping it closes the scope.
#[derive(Debug)]
pub struct CrewScope<'a> {
    crew: &'a mut Crew,
}

impl CrewScope<'_> {
    /// Register a node in the crew.
    pub fn register(&mut self, node: AgentNode) -> NodeId {
        self.crew.push_node(node)
    }

    /// See [`Crew::connect`].
    pub fn connect(&mut self, producer: NodeId, consumer: NodeId) -> Result<&mut Self> {
        self.crew.connect(producer, consumer)?;
        Ok(self)
    }

    /// See [`Crew::add_dependency`].
    pub fn add_dependency(&mut self, node: NodeId, dependencies: impl IntoNodeIds) -> Result<&mut Self> {
        self.crew.add_dependency(node, dependencies)?;
        Ok(self)
    }

    /// See [`Crew::add_dependent`].
    pub fn add_dependent(&mut self, node: NodeId, dependents: impl IntoNodeIds) -> Result<&mut Self> {
        self.crew.add_dependent(node, dependents)?;
        Ok(self)
    }

    /// Read access to the crew.
    pub fn crew(&self) -> &Crew {
        self.crew
    }
}

impl Drop for CrewScope<'_> {
    fn drop(&mut self) {
        self.crew.active = false;
        tracing::debug!(crew = %self.crew.name, "Crew scope closed");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
