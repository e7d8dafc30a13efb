//! Run command - executes a crew definition.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use serde::Serialize;

use super::Context;
use crate::{backend, builtin};

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Crew definition file (TOML)
    pub file: PathBuf,

    /// Print only the last agent's output
    #[arg(long)]
    pub last: bool,
}

#[derive(Debug, Serialize)]
struct RunOutput {
    agent: String,
    output: String,
}

/// Run the run command.
pub async fn run(args: RunArgs, ctx: &Context) -> Result<()> {
    let mut crew = super::load_crew(&args.file, &builtin::tools()?, ctx)?;
    let llm = backend::build(&ctx.config.llm())?;

    if ctx.verbose {
        let dim = Style::new().dim();
        eprintln!(
            "{}",
            dim.apply_to(format!(
                "Running crew '{}' with {} agents on {}",
                crew.name(),
                crew.len(),
                llm.name()
            ))
        );
    }

    let outputs = crew.run(&llm).await?;
    let outputs: Vec<RunOutput> = outputs
        .into_iter()
        .map(|o| RunOutput {
            agent: o.agent,
            output: o.output,
        })
        .collect();
    let shown = if args.last {
        &outputs[outputs.len().saturating_sub(1)..]
    } else {
        &outputs[..]
    };

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    for output in shown {
        println!("{}", style(&output.agent).bold().cyan());
        println!("{}", dim.apply_to("─".repeat(40)));
        println!("{}", output.output);
        println!();
    }
    Ok(())
}
