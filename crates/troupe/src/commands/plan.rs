//! Plan command - prints the execution order of a crew.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use serde::Serialize;

use super::Context;
use crate::builtin;

/// Arguments for the plan command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Crew definition file (TOML)
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct PlanStep {
    step: usize,
    agent: String,
    dependencies: Vec<String>,
}

/// Run the plan command.
pub fn run(args: PlanArgs, ctx: &Context) -> Result<()> {
    let crew = super::load_crew(&args.file, &builtin::tools()?, ctx)?;
    let order = crew.topological_order()?;

    let mut steps = Vec::with_capacity(order.len());
    for (i, id) in order.into_iter().enumerate() {
        let node = crew.node(id)?;
        let dependencies = node
            .dependencies()
            .iter()
            .map(|dep| crew.node(*dep).map(|n| n.name().to_string()))
            .collect::<troupe_crew::Result<Vec<_>>>()?;
        steps.push(PlanStep {
            step: i + 1,
            agent: node.name().to_string(),
            dependencies,
        });
    }

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&steps)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{}", style(format!("Crew '{}'", crew.name())).bold());
    for step in &steps {
        if step.dependencies.is_empty() {
            println!("  {}. {}", step.step, step.agent);
        } else {
            println!(
                "  {}. {} {}",
                step.step,
                step.agent,
                dim.apply_to(format!("(after {})", step.dependencies.join(", ")))
            );
        }
    }
    Ok(())
}
