//! Stride Command-Line Runner
//!
//! Applies, rolls back and scaffolds SQL migrations for a SQLite database.

mod args;
mod commands;

use clap::Parser;
use std::sync::Arc;
use stride_core::TracingLogger;
use tracing_subscriber::EnvFilter;

use args::Args;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stride=info")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (config, command) = args.into_config();
    tracing::debug!(
        migrations_dir = %config.migrations_dir.display(),
        database = %config.database_path.display(),
        table = %config.table,
        dry_run = config.dry_run,
        "starting migration run"
    );

    commands::execute(command, &config, Arc::new(TracingLogger)).await?;
    Ok(())
}
