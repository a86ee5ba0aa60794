//! Command-line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stride_core::adapters::DEFAULT_TABLE;
use stride_core::config::{DEFAULT_DATABASE_PATH, DEFAULT_MIGRATIONS_DIR};
use stride_core::RunnerConfig;

/// Stride schema migration runner
#[derive(Parser, Debug)]
#[command(name = "stride")]
#[command(version, about = "Stride schema migration runner", long_about = None)]
pub struct Args {
    /// Directory holding migration scripts
    #[arg(long, global = true, default_value = DEFAULT_MIGRATIONS_DIR)]
    pub migrations_dir: PathBuf,

    /// Path to the SQLite database
    #[arg(long, global = true, default_value = DEFAULT_DATABASE_PATH)]
    pub database: PathBuf,

    /// Name of the bookkeeping table
    #[arg(long, global = true, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Log what would run without executing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Runner subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List migrations that have not been applied
    ShowPending,
    /// List applied migrations, most recent first
    ShowApplied,
    /// Apply pending migrations in order
    MigrateUp {
        /// Maximum number of migrations to apply (all if omitted)
        count: Option<usize>,
    },
    /// Roll back the most recently applied migrations
    MigrateDown {
        /// Number of migrations to roll back
        count: usize,
    },
    /// Create a new empty migration
    Create {
        /// Descriptive name, embedded in the identifier
        name: String,
    },
}

impl Args {
    /// Convert command-line arguments to runner configuration.
    pub fn into_config(self) -> (RunnerConfig, Command) {
        let config = RunnerConfig::new(self.migrations_dir, self.database)
            .with_table(self.table)
            .with_dry_run(self.dry_run);
        (config, self.command)
    }
}
