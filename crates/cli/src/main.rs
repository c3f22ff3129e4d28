//! ironloom CLI — the main entry point.
//!
//! Commands:
//! - `run`     — Execute a workflow definition file
//! - `query`   — Search long-term memory across past workflows
//! - `memory`  — Manage the memory store

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "ironloom",
    about = "ironloom — multi-agent LLM workflow engine",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a workflow definition file
    Run {
        /// Path to the workflow TOML file
        workflow: PathBuf,
    },

    /// Search long-term memory across past workflows
    Query {
        /// The search text
        text: String,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// Manage the memory store
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Create the vector collection if it does not exist yet
    Init,

    /// Delete every stored memory entry
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        confirm: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run { workflow } => commands::run::run(&workflow).await?,
        Commands::Query { text, limit } => commands::query::run(&text, limit).await?,
        Commands::Memory { action } => match action {
            MemoryAction::Init => commands::memory::init().await?,
            MemoryAction::Clear { confirm } => commands::memory::clear(confirm).await?,
        },
    }

    Ok(())
}
