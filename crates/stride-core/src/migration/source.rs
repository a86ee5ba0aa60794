//! Migration sources and transformations.
//!
//! A source lists the identifiers it knows about and resolves each one to a
//! [`Migration`] at execution time. The engine never looks at how a source
//! stores its entries.

use super::error::{BoxError, Result};
use super::id::MigrationId;
use crate::logger::Logger;
use async_trait::async_trait;
use std::sync::Arc;

/// A reversible transformation over a connection of type `C`.
#[async_trait]
pub trait Migration<C: Send>: Send + Sync {
    /// Apply the migration.
    async fn up(&self, conn: &mut C, logger: &dyn Logger) -> std::result::Result<(), BoxError>;

    /// Revert the migration.
    async fn down(&self, conn: &mut C, logger: &dyn Logger)
        -> std::result::Result<(), BoxError>;
}

/// Lists available migrations and loads them by identifier.
#[async_trait]
pub trait MigrationSource<C: Send>: Send + Sync {
    /// List available identifiers in ascending order.
    async fn list_available(&self) -> Result<Vec<MigrationId>>;

    /// Resolve an identifier to its migration.
    async fn load(&self, id: &MigrationId) -> Result<Arc<dyn Migration<C>>>;
}

/// A source that new migrations can be written to.
#[async_trait]
pub trait WritableSource: Send + Sync {
    /// Write an empty migration skeleton under `id`.
    ///
    /// Fails with `SourceWrite` if an entry for `id` already exists.
    async fn write_skeleton(&self, id: &MigrationId) -> Result<()>;
}

/// Migration whose transformations do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMigration;

#[async_trait]
impl<C: Send> Migration<C> for NoopMigration {
    async fn up(&self, _conn: &mut C, _logger: &dyn Logger) -> std::result::Result<(), BoxError> {
        Ok(())
    }

    async fn down(
        &self,
        _conn: &mut C,
        _logger: &dyn Logger,
    ) -> std::result::Result<(), BoxError> {
        Ok(())
    }
}

/// Sort identifiers ascending and reject duplicates.
pub(crate) fn sort_unique(mut ids: Vec<MigrationId>) -> Result<Vec<MigrationId>> {
    ids.sort();
    if let Some(pair) = ids.windows(2).find(|w| w[0] == w[1]) {
        return Err(super::error::MigrateError::DuplicateMigration {
            id: pair[0].clone(),
        });
    }
    Ok(ids)
}
