//! resume-tailor CLI
//!
//! Tailors a resume to job postings and keeps a local version log in step
//! with the document's revision history.

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use context::Context;
use error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` applies unless `--verbose` forces debug.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
    tracing::debug!("Verbose mode enabled");
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;

    if let Commands::Init { body, document_id } = &cli.command {
        return commands::run_init(&cwd, body, document_id.as_deref());
    }

    let ctx = Context::load(&cwd, cli.config.as_deref())?;
    execute_command(&ctx, &cwd, cli.command).await
}

async fn execute_command(ctx: &Context, cwd: &std::path::Path, cmd: Commands) -> Result<()> {
    match cmd {
        // Handled before the context exists.
        Commands::Init { .. } => Ok(()),
        Commands::Update { job, tags, dry_run } => {
            commands::run_update(ctx, &cwd.join(job), tags.into(), dry_run).await
        }
        Commands::Batch { file } => commands::run_batch(ctx, &cwd.join(file)).await,
        Commands::List { json } => commands::run_list(ctx, json).await,
        Commands::Revert { target } => commands::run_revert(ctx, &target).await,
        Commands::Export { target, output } => {
            let output = output.map(|o| cwd.join(o));
            commands::run_export(ctx, &target, output.as_deref()).await
        }
        Commands::Tag { target, tags } => commands::run_tag(ctx, &target, tags.into()),
        Commands::Search { term } => commands::run_search(ctx, &term),
        Commands::Monitor { feed, process } => {
            let feed = feed.map(|f| cwd.join(f));
            commands::run_monitor(ctx, feed.as_deref(), process).await
        }
    }
}
