//! Stride Core - Migration reconciliation and execution.
//!
//! This crate tracks which schema migrations have been applied to a backend,
//! applies pending ones in order and rolls back the most recent ones.
//! Backends are pluggable through [`migration::MigrateAdapter`]; migrations
//! come from a [`migration::MigrationSource`] such as a directory of SQL
//! scripts or an in-process registry.

pub mod adapters;
pub mod config;
pub mod logger;
pub mod migration;

pub use adapters::{MemoryAdapter, SledAdapter, SqliteAdapter};
pub use config::RunnerConfig;
pub use logger::{Logger, MemoryLogger, NullLogger, TracingLogger};
pub use migration::{
    BatchReport, DirectorySource, EngineConfig, MigrateAdapter, MigrateError, Migration,
    MigrationEngine, MigrationId, MigrationRegistry, MigrationSource, Scaffolder,
};
