//! Runner configuration.

use crate::adapters::{SqliteAdapter, DEFAULT_TABLE};
use crate::migration::{DirectorySource, EngineConfig};
use std::path::PathBuf;

/// Default directory holding migration scripts.
pub const DEFAULT_MIGRATIONS_DIR: &str = "./migrations";

/// Default SQLite database file.
pub const DEFAULT_DATABASE_PATH: &str = "./stride.db";

/// Configuration for a migration run against a SQLite database.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Directory holding migration scripts.
    pub migrations_dir: PathBuf,

    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Name of the bookkeeping table.
    pub table: String,

    /// Log batches without executing them.
    pub dry_run: bool,
}

impl RunnerConfig {
    /// Create a configuration for the given migrations directory and database.
    pub fn new(migrations_dir: impl Into<PathBuf>, database_path: impl Into<PathBuf>) -> Self {
        Self {
            migrations_dir: migrations_dir.into(),
            database_path: database_path.into(),
            table: DEFAULT_TABLE.to_string(),
            dry_run: false,
        }
    }

    /// Set the bookkeeping table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Enable or disable dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default().with_dry_run(self.dry_run)
    }

    /// Backend adapter for the configured database.
    pub fn adapter(&self) -> SqliteAdapter {
        SqliteAdapter::new(&self.database_path).with_table(&self.table)
    }

    /// Migration source for the configured directory.
    pub fn source(&self) -> DirectorySource {
        DirectorySource::new(&self.migrations_dir)
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MIGRATIONS_DIR, DEFAULT_DATABASE_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.migrations_dir, PathBuf::from("./migrations"));
        assert_eq!(config.database_path, PathBuf::from("./stride.db"));
        assert_eq!(config.table, DEFAULT_TABLE);
        assert!(!config.dry_run);
        assert!(!config.engine_config().dry_run);
    }

    #[test]
    fn test_config_builder() {
        let config = RunnerConfig::new("/srv/app/migrations", "/srv/app/app.db")
            .with_table("schema_history")
            .with_dry_run(true);

        assert_eq!(config.migrations_dir, PathBuf::from("/srv/app/migrations"));
        assert_eq!(config.database_path, PathBuf::from("/srv/app/app.db"));
        assert!(config.engine_config().dry_run);

        let adapter = config.adapter();
        assert_eq!(adapter.table(), "schema_history");
        assert_eq!(adapter.path(), config.database_path.as_path());
        assert_eq!(config.source().dir(), config.migrations_dir.as_path());
    }
}
