//! Tool command - one round of tool calls with the built-in tools.

use anyhow::Result;
use clap::Args;
use console::Style;
use serde_json::json;
use troupe_agent::ToolAgent;

use super::Context;
use crate::{backend, builtin};

/// Arguments for the tool command.
#[derive(Args, Debug)]
pub struct ToolArgs {
    /// The prompt to answer
    #[arg(required = true)]
    pub prompt: String,
}

/// Run the tool command.
pub async fn run(args: ToolArgs, ctx: &Context) -> Result<()> {
    let llm = backend::build(&ctx.config.llm())?;
    let agent = ToolAgent::new(llm, builtin::tools()?).with_model(ctx.model());

    let run = agent.run_detailed(&args.prompt).await?;

    if ctx.json_output {
        let calls: Vec<_> = run
            .observations
            .iter()
            .map(|o| {
                json!({
                    "index": o.index,
                    "tool": o.call.name,
                    "result": o.result.to_value(),
                })
            })
            .collect();
        let output = json!({ "answer": run.answer, "tool_calls": calls });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    for observation in &run.observations {
        println!(
            "{}",
            dim.apply_to(format!(
                "[{}] {} -> {}",
                observation.index, observation.call.name, observation.result
            ))
        );
    }
    println!("{}", run.answer);
    Ok(())
}
