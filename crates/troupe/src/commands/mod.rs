//! CLI command handlers.

use std::path::Path;

use anyhow::{Context as _, Result};
use troupe_agent::ToolRegistry;
use troupe_config::TroupeConfig;
use troupe_crew::{Crew, CrewFile, RunSettings};

pub mod graph;
pub mod plan;
pub mod reflect;
pub mod run;
pub mod tool;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Merged configuration.
    pub config: TroupeConfig,
    /// Model override from the command line.
    pub model: Option<String>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// The model commands should use.
    pub fn model(&self) -> String {
        crate::backend::model(&self.config.llm(), self.model.as_deref())
    }

    /// Run settings derived from the config.
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            default_model: self.model(),
            max_rounds: self.config.agent().max_rounds,
        }
    }
}

/// Load, validate and build a crew definition file.
///
/// A model in the definition applies unless `--model` was given.
pub fn load_crew(path: &Path, tools: &ToolRegistry, ctx: &Context) -> Result<Crew> {
    let mut file = CrewFile::from_file(path)?;
    if ctx.model.is_some() {
        file.crew.model = None;
    }
    let crew = file
        .crew
        .build_with(tools, ctx.run_settings())
        .with_context(|| format!("invalid crew definition {}", path.display()))?;
    Ok(crew)
}
