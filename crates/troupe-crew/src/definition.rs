//! Declarative crew definitions.
//!
//! Parses TOML crew files into `CrewDefinition` structs, validates them, and
//! builds a runnable [`Crew`].
//!
//! # Example TOML
//!
//! ```toml
//! [crew]
//! name = "poetry"
//! description = "Write and translate a poem"
//! model = "llama-3.3-70b-versatile"
//!
//! [[crew.agents]]
//! name = "poet"
//! backstory = "You are a well-known poet."
//! task = "Write a short poem about the sea."
//! expected_output = "A poem of four lines."
//!
//! [[crew.agents]]
//! name = "translator"
//! backstory = "You are a translator."
//! task = "Translate the poem into Spanish."
//! dependencies = ["poet"]
//!
//! [[crew.agents]]
//! name = "counter"
//! task = "Count the words of the translated poem."
//! tools = ["word_count"]
//! dependencies = ["translator"]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use troupe_agent::ToolRegistry;

use crate::crew::Crew;
use crate::error::{CrewError, Result};
use crate::node::{AgentNode, NodeId, RunSettings};

/// Top-level wrapper matching the TOML structure `[crew]`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrewFile {
    pub crew: CrewDefinition,
}

/// A complete declarative crew.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrewDefinition {
    /// Crew name.
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Model for agents without their own.
    #[serde(default)]
    pub model: Option<String>,

    /// Agents, in registration order.
    #[serde(default)]
    pub agents: Vec<AgentDefinition>,
}

/// A single agent within a crew.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentDefinition {
    /// Unique agent name within this crew.
    pub name: String,

    #[serde(default)]
    pub backstory: String,

    /// Task description.
    pub task: String,

    #[serde(default)]
    pub expected_output: String,

    /// Names of tools from the registry this agent may call.
    #[serde(default)]
    pub tools: Vec<String>,

    /// Names of agents that must run before this one.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Model override.
    #[serde(default)]
    pub model: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl CrewFile {
    /// Parse a crew definition from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| CrewError::definition(format!("TOML parse error: {e}")))
    }

    /// Load a crew definition from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CrewError::definition(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl CrewDefinition {
    /// Validate the definition against the available tools.
    ///
    /// Checks:
    /// - Non-empty crew and agent names
    /// - No duplicate agent names
    /// - All dependency references point to existing agents
    /// - All tools exist in the registry
    /// - No cycles in the dependency graph
    pub fn validate(&self, tools: &ToolRegistry) -> Result<()> {
        self.check_references(tools)?;
        self.assemble(tools)?.topological_order()?;
        Ok(())
    }

    fn check_references(&self, tools: &ToolRegistry) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CrewError::definition("Crew name cannot be empty"));
        }

        let mut seen = HashSet::new();
        for agent in &self.agents {
            if agent.name.trim().is_empty() {
                return Err(CrewError::definition("Agent name cannot be empty"));
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(CrewError::DuplicateAgent(agent.name.clone()));
            }
        }

        for agent in &self.agents {
            for dep in &agent.dependencies {
                if !seen.contains(dep.as_str()) {
                    return Err(CrewError::definition(format!(
                        "Agent '{}' depends on unknown agent '{}'",
                        agent.name, dep
                    )));
                }
            }
            for tool in &agent.tools {
                if !tools.contains(tool) {
                    return Err(CrewError::definition(format!(
                        "Agent '{}' uses unknown tool '{}'",
                        agent.name, tool
                    )));
                }
            }
        }

        Ok(())
    }

    /// Build a crew with default run settings.
    pub fn build(&self, tools: &ToolRegistry) -> Result<Crew> {
        self.build_with(tools, RunSettings::default())
    }

    /// Build a crew, validating it first.
    ///
    /// A crew-level model replaces the default model of `settings`.
    pub fn build_with(&self, tools: &ToolRegistry, settings: RunSettings) -> Result<Crew> {
        self.check_references(tools)?;
        let mut settings = settings;
        if let Some(model) = &self.model {
            settings.default_model = model.clone();
        }
        let crew = self.assemble(tools)?.with_settings(settings);
        crew.topological_order()?;
        debug!(crew = %self.name, agents = crew.len(), "Built crew from definition");
        Ok(crew)
    }

    fn assemble(&self, tools: &ToolRegistry) -> Result<Crew> {
        let mut crew = Crew::new(self.name.clone());
        let mut ids: HashMap<&str, NodeId> = HashMap::new();

        let mut scope = crew.activate()?;
        for agent in &self.agents {
            let names: Vec<&str> = agent.tools.iter().map(String::as_str).collect();
            let mut node = AgentNode::new(&agent.name, &agent.backstory, &agent.task)
                .with_expected_output(&agent.expected_output)
                .with_tools(tools.filtered_by_names(&names));
            if let Some(model) = &agent.model {
                node = node.with_model(model);
            }
            ids.insert(agent.name.as_str(), scope.register(node));
        }

        for agent in &self.agents {
            let node = ids[agent.name.as_str()];
            for dep in &agent.dependencies {
                let producer = ids
                    .get(dep.as_str())
                    .copied()
                    .ok_or_else(|| CrewError::definition(format!("Unknown agent '{dep}'")))?;
                scope.connect(producer, node)?;
            }
        }
        drop(scope);

        Ok(crew)
    }
}

#[cfg(test)]
mod tests {
    use troupe_agent::{ArgType, FnTool, ToolResult};

    use super::*;

    const POETRY_CREW: &str = r#"
[crew]
name = "poetry"
description = "Write and translate a poem"
model = "llama-3.1-8b-instant"

[[crew.agents]]
name = "poet"
backstory = "You are a well-known poet."
task = "Write a short poem about the sea."
expected_output = "A poem of four lines."

[[crew.agents]]
name = "translator"
task = "Translate the poem into Spanish."
dependencies = ["poet"]
model = "llama-3.3-70b-versatile"

[[crew.agents]]
name = "counter"
task = "Count the words."
tools = ["word_count"]
dependencies = ["translator"]
"#;

    fn registry() -> ToolRegistry {
        let mut tools = ToolRegistry::new();
        tools
            .register(
                FnTool::builder("word_count")
                    .param("text", ArgType::Str)
                    .handler(|args| {
                        Ok(ToolResult::from(args.str("text")?.split_whitespace().count() as i64))
                    })
                    .build()
                    .unwrap(),
            )
            .unwrap();
        tools
    }

    #[test]
    fn test_parse_crew() {
        let file = CrewFile::from_toml(POETRY_CREW).unwrap();
        assert_eq!(file.crew.name, "poetry");
        assert_eq!(file.crew.agents.len(), 3);
        assert_eq!(file.crew.agents[1].dependencies, vec!["poet"]);
        assert_eq!(file.crew.agents[2].tools, vec!["word_count"]);
        assert!(file.crew.agents[1].backstory.is_empty());
    }

    #[test]
    fn test_build_crew() {
        let file = CrewFile::from_toml(POETRY_CREW).unwrap();
        let crew = file.crew.build(&registry()).unwrap();

        assert_eq!(crew.name(), "poetry");
        assert_eq!(crew.settings().default_model, "llama-3.1-8b-instant");

        let order: Vec<&str> = crew
            .topological_order()
            .unwrap()
            .into_iter()
            .map(|id| crew.node(id).unwrap().name())
            .collect();
        assert_eq!(order, vec!["poet", "translator", "counter"]);

        let counter = crew.node(crew.find("counter").unwrap()).unwrap();
        assert!(counter.tools().contains("word_count"));
        let translator = crew.node(crew.find("translator").unwrap()).unwrap();
        assert_eq!(translator.model(), Some("llama-3.3-70b-versatile"));
        assert!(translator.tools().is_empty());
        assert!(!crew.is_active());
    }

    #[test]
    fn test_duplicate_agent() {
        let toml = r#"
[crew]
name = "c"

[[crew.agents]]
name = "a"
task = "x"

[[crew.agents]]
name = "a"
task = "y"
"#;
        let file = CrewFile::from_toml(toml).unwrap();
        assert!(matches!(
            file.crew.validate(&registry()),
            Err(CrewError::DuplicateAgent(name)) if name == "a"
        ));
    }

    #[test]
    fn test_unknown_dependency() {
        let toml = r#"
[crew]
name = "c"

[[crew.agents]]
name = "a"
task = "x"
dependencies = ["ghost"]
"#;
        let err = CrewFile::from_toml(toml).unwrap().crew.validate(&registry()).unwrap_err();
        assert!(err.to_string().contains("unknown agent 'ghost'"));
    }

    #[test]
    fn test_unknown_tool() {
        let toml = r#"
[crew]
name = "c"

[[crew.agents]]
name = "a"
task = "x"
tools = ["teleport"]
"#;
        let err = CrewFile::from_toml(toml).unwrap().crew.validate(&registry()).unwrap_err();
        assert!(err.to_string().contains("unknown tool 'teleport'"));
    }

    #[test]
    fn test_cycle() {
        let toml = r#"
[crew]
name = "c"

[[crew.agents]]
name = "a"
task = "x"
dependencies = ["b"]

[[crew.agents]]
name = "b"
task = "y"
dependencies = ["a"]
"#;
        let def = CrewFile::from_toml(toml).unwrap().crew;
        assert!(matches!(def.validate(&registry()), Err(CrewError::Cycle(_))));
        assert!(matches!(def.build(&registry()), Err(CrewError::Cycle(_))));
    }

    #[test]
    fn test_empty_name_rejected() {
        let toml = r#"
[crew]
name = ""
"#;
        let def = CrewFile::from_toml(toml).unwrap().crew;
        assert!(matches!(def.validate(&registry()), Err(CrewError::InvalidDefinition(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let err = CrewFile::from_toml("[crew\nname =").unwrap_err();
        assert!(matches!(err, CrewError::InvalidDefinition(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crew.toml");
        std::fs::write(&path, POETRY_CREW).unwrap();
        assert_eq!(CrewFile::from_file(&path).unwrap().crew.agents.len(), 3);

        let missing = CrewFile::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(missing.to_string().contains("Failed to read"));
    }
}
