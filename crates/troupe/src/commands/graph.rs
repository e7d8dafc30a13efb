//! Graph command - prints a crew as Graphviz DOT.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::Context;
use crate::builtin;

/// Arguments for the graph command.
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Crew definition file (TOML)
    pub file: PathBuf,
}

/// Run the graph command.
pub fn run(args: GraphArgs, ctx: &Context) -> Result<()> {
    let crew = super::load_crew(&args.file, &builtin::tools()?, ctx)?;
    let graph = crew.render();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&graph)?);
    } else {
        print!("{}", graph.to_dot());
    }
    Ok(())
}
