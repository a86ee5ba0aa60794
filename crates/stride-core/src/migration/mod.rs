//! Migration engine for Stride.
//!
//! This module tracks which migrations have been applied to a backend and
//! applies or rolls back the rest:
//! - Reading available migrations from a source
//! - Reading the applied record through a backend adapter
//! - Reconciling both into an ordered pending list
//! - Sequential apply/rollback with per-step bookkeeping
//! - Scaffolding new timestamped migrations
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stride_core::adapters::SqliteAdapter;
//! use stride_core::migration::{DirectorySource, EngineConfig, MigrationEngine};
//! use stride_core::TracingLogger;
//!
//! let mut engine = MigrationEngine::new(
//!     SqliteAdapter::new("app.db"),
//!     DirectorySource::new("migrations"),
//!     Arc::new(TracingLogger),
//!     EngineConfig::default(),
//! );
//!
//! // Apply everything that is pending
//! let report = engine.migrate_up(None).await?;
//! println!("applied {} migration(s)", report.completed.len());
//!
//! // Roll back the most recent one
//! engine.migrate_down(1).await?;
//! ```

pub mod adapter;
pub mod directory;
pub mod engine;
pub mod error;
pub mod id;
pub mod reconcile;
pub mod registry;
pub mod scaffold;
pub mod script;
pub mod source;

// Re-export main types

pub use adapter::MigrateAdapter;
pub use directory::DirectorySource;
pub use engine::{BatchReport, Direction, EngineConfig, EngineState, MigrationEngine};
pub use error::{BoxError, MigrateError, Result};
pub use id::MigrationId;
pub use reconcile::{compute_pending, orphaned, select_apply, select_rollback};
pub use registry::MigrationRegistry;
pub use scaffold::{validate_name, Scaffolder};
pub use script::{ScriptExecutor, ScriptMigration};
pub use source::{Migration, MigrationSource, NoopMigration, WritableSource};
