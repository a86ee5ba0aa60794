//! Scaffolding of new migrations.

use super::error::{MigrateError, Result};
use super::id::MigrationId;
use super::source::WritableSource;
use crate::logger::Logger;
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;

/// Creates timestamped migration skeletons in a writable source.
pub struct Scaffolder<W> {
    source: W,
    logger: Arc<dyn Logger>,
}

impl<W: WritableSource> Scaffolder<W> {
    /// Create a scaffolder writing to `source`.
    pub fn new(source: W, logger: Arc<dyn Logger>) -> Self {
        Self { source, logger }
    }

    /// The target source.
    pub fn source(&self) -> &W {
        &self.source
    }

    /// Create a migration stamped with the current local time.
    pub async fn create_migration(&self, name: &str) -> Result<MigrationId> {
        self.create_migration_at(name, Local::now().naive_local())
            .await
    }

    /// Create a migration stamped with `at`.
    pub async fn create_migration_at(&self, name: &str, at: NaiveDateTime) -> Result<MigrationId> {
        validate_name(name)?;
        let id = MigrationId::generate(name, at);
        self.logger
            .info(&format!("Creating new migration {}.", id));
        self.source.write_skeleton(&id).await?;
        Ok(id)
    }
}

/// Check that a migration name can be embedded in an identifier.
pub fn validate_name(name: &str) -> Result<()> {
    let reject = |reason: &str| {
        Err(MigrateError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.is_empty() {
        return reject("name is empty");
    }
    if name.chars().any(char::is_whitespace) {
        return reject("name contains whitespace");
    }
    if name.contains(['/', '\\']) {
        return reject("name contains a path separator");
    }
    if name.contains('.') {
        return reject("name contains a dot");
    }
    Ok(())
}
