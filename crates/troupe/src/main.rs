//! Troupe - dependency-ordered crews of LLM agents
//!
//! Main entry point for the Troupe CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::Style;

mod backend;
mod builtin;
mod commands;

use commands::{graph, plan, reflect, run, tool};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Troupe - dependency-ordered crews of LLM agents
#[derive(Parser)]
#[command(name = "troupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Model to use instead of the configured one
    #[arg(long, global = true, env = "TROUPE_MODEL")]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a crew definition
    Run(run::RunArgs),

    /// Print the execution order of a crew definition
    Plan(plan::PlanArgs),

    /// Print a crew definition as a Graphviz graph
    Graph(graph::GraphArgs),

    /// Answer a prompt with one round of the built-in tools
    Tool(tool::ToolArgs),

    /// Refine an answer with a generate / critique loop
    Reflect(reflect::ReflectArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = troupe_config::load_config(None)?;
    let logging = loaded.config.logging();

    // Console (human-readable) + rotating JSON file
    let console_filter = if cli.verbose {
        "troupe=debug,troupe_crew=debug,troupe_agent=debug,troupe_llm=debug,troupe_config=debug,info"
            .to_string()
    } else {
        format!(
            "troupe={0},troupe_crew={0},troupe_agent={0},troupe_llm={0},warn",
            logging.level
        )
    };
    let console_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(console_filter));

    let file_layer = match troupe_config::log_dir() {
        Some(log_dir) if logging.file => {
            let file_appender = tracing_appender::rolling::daily(&log_dir, "troupe.log");
            Some(tracing_appender::non_blocking(file_appender))
        }
        _ => None,
    };

    use tracing_subscriber::prelude::*;
    let (file_writer, _guard) = match file_layer {
        Some((writer, guard)) => (Some(writer), Some(guard)),
        None => (None, None),
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .with(file_writer.map(|writer| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "troupe=trace,troupe_crew=trace,troupe_agent=trace,troupe_llm=trace,troupe_config=trace,info",
                ))
        }))
        .init();

    let dim = Style::new().dim();
    for warning in &loaded.warnings {
        eprintln!("{} {}", Style::new().yellow().apply_to("warning:"), warning);
    }
    if cli.verbose {
        for path in loaded.loaded_from() {
            eprintln!("{}", dim.apply_to(format!("Loaded config from {}", path.display())));
        }
    }

    let ctx = commands::Context {
        config: loaded.config,
        model: cli.model,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Run(args) => run::run(args, &ctx).await,
        Commands::Plan(args) => plan::run(args, &ctx),
        Commands::Graph(args) => graph::run(args, &ctx),
        Commands::Tool(args) => tool::run(args, &ctx).await,
        Commands::Reflect(args) => reflect::run(args, &ctx).await,
    }
}
