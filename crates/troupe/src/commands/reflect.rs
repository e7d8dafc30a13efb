//! Reflect command - generate / critique loop.

use anyhow::Result;
use clap::Args;
use console::Style;
use serde_json::json;
use troupe_agent::ReflectionAgent;
use troupe_agent::prompt::{DEFAULT_GENERATION_PROMPT, DEFAULT_REFLECTION_PROMPT};

use super::Context;
use crate::backend;

/// Arguments for the reflect command.
#[derive(Args, Debug)]
pub struct ReflectArgs {
    /// The request to answer
    #[arg(required = true)]
    pub prompt: String,

    /// Number of generate / critique steps (defaults to the config)
    #[arg(short = 'n', long)]
    pub steps: Option<u32>,

    /// System prompt for the generator
    #[arg(long, default_value = DEFAULT_GENERATION_PROMPT)]
    pub generation_prompt: String,

    /// System prompt for the critic
    #[arg(long, default_value = DEFAULT_REFLECTION_PROMPT)]
    pub reflection_prompt: String,
}

/// Run the reflect command.
pub async fn run(args: ReflectArgs, ctx: &Context) -> Result<()> {
    let agent_config = ctx.config.agent();
    let llm = backend::build(&ctx.config.llm())?;
    let agent = ReflectionAgent::new(llm)
        .with_model(ctx.model())
        .with_history_capacity(agent_config.history_capacity);
    let steps = args.steps.unwrap_or(agent_config.reflection_steps);

    let outcome = agent
        .run_detailed(&args.generation_prompt, &args.reflection_prompt, &args.prompt, steps)
        .await?;

    if ctx.json_output {
        let output = json!({
            "output": outcome.output,
            "steps": outcome.steps,
            "accepted": outcome.accepted,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if ctx.verbose {
        let dim = Style::new().dim();
        let how = if outcome.accepted { "accepted" } else { "step limit" };
        eprintln!("{}", dim.apply_to(format!("[{} steps, {}]", outcome.steps, how)));
    }
    println!("{}", outcome.output);
    Ok(())
}
