//! Subcommand execution.

use crate::args::Command;
use std::sync::Arc;
use stride_core::adapters::SqliteAdapter;
use stride_core::migration::{DirectorySource, MigrateError, MigrationEngine, Scaffolder};
use stride_core::{Logger, RunnerConfig};

/// Run one subcommand against the configured database and directory.
pub async fn execute(
    command: Command,
    config: &RunnerConfig,
    logger: Arc<dyn Logger>,
) -> Result<(), MigrateError> {
    match command {
        Command::ShowPending => {
            engine(config, logger).show_pending().await?;
        }
        Command::ShowApplied => {
            engine(config, logger).show_applied().await?;
        }
        Command::MigrateUp { count } => {
            engine(config, logger).migrate_up(count).await?;
        }
        Command::MigrateDown { count } => {
            engine(config, logger).migrate_down(count).await?;
        }
        Command::Create { name } => {
            Scaffolder::new(config.source(), logger)
                .create_migration(&name)
                .await?;
        }
    }
    Ok(())
}

fn engine(
    config: &RunnerConfig,
    logger: Arc<dyn Logger>,
) -> MigrationEngine<SqliteAdapter, DirectorySource> {
    MigrationEngine::new(
        config.adapter(),
        config.source(),
        logger,
        config.engine_config(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_core::MemoryLogger;

    fn config(dir: &tempfile::TempDir) -> RunnerConfig {
        RunnerConfig::new(dir.path().join("migrations"), dir.path().join("app.db"))
    }

    #[tokio::test]
    async fn test_create_then_migrate() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let logger = MemoryLogger::new();

        execute(
            Command::Create {
                name: "init".to_string(),
            },
            &config,
            Arc::new(logger.clone()),
        )
        .await
        .unwrap();
        assert_eq!(std::fs::read_dir(&config.migrations_dir).unwrap().count(), 1);

        execute(Command::ShowPending, &config, Arc::new(logger.clone()))
            .await
            .unwrap();
        assert!(logger.contains("1 pending migration(s) found"));

        execute(
            Command::MigrateUp { count: None },
            &config,
            Arc::new(logger.clone()),
        )
        .await
        .unwrap();
        assert!(logger.contains("1 migration(s) to apply"));

        logger.clear();
        execute(Command::ShowApplied, &config, Arc::new(logger.clone()))
            .await
            .unwrap();
        assert!(logger.contains("1 applied migration(s) found"));

        execute(
            Command::MigrateDown { count: 1 },
            &config,
            Arc::new(logger.clone()),
        )
        .await
        .unwrap();
        assert!(logger.contains("1 migration(s) to roll back"));
    }

    #[tokio::test]
    async fn test_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = execute(
            Command::ShowPending,
            &config(&dir),
            Arc::new(MemoryLogger::new()),
        )
        .await;
        assert!(matches!(result, Err(MigrateError::SourceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_create_leaves_database_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);

        execute(
            Command::Create {
                name: "add_users".to_string(),
            },
            &config,
            Arc::new(MemoryLogger::new()),
        )
        .await
        .unwrap();

        assert!(config.migrations_dir.is_dir());
        assert!(!config.database_path.exists());
    }

    #[tokio::test]
    async fn test_invalid_name_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = execute(
            Command::Create {
                name: "two words".to_string(),
            },
            &config(&dir),
            Arc::new(MemoryLogger::new()),
        )
        .await;
        assert!(matches!(result, Err(MigrateError::InvalidName { .. })));
    }
}
