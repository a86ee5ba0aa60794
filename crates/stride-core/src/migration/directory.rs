//! Directory-backed migration source.
//!
//! Every regular, non-hidden file in the directory is one migration; symlinks
//! are followed. The identifier is the file name with its final extension
//! stripped; the file content is a script (see [`super::script`]).

use super::error::{MigrateError, Result};
use super::id::MigrationId;
use super::script::{ScriptExecutor, ScriptMigration, SKELETON};
use super::source::{sort_unique, Migration, MigrationSource, WritableSource};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Default extension of newly written migrations.
pub const DEFAULT_EXTENSION: &str = "sql";

/// Migration source reading script files from a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    extension: String,
}

impl DirectorySource {
    /// Create a source over `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Set the extension used for new migration files.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// The migrations directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a new migration with this identifier is written to.
    pub fn path_for(&self, id: &MigrationId) -> PathBuf {
        if self.extension.is_empty() {
            self.dir.join(id.as_str())
        } else {
            self.dir.join(format!("{}.{}", id, self.extension))
        }
    }

    /// List `(identifier, path)` for every migration entry.
    async fn entries(&self) -> Result<Vec<(MigrationId, PathBuf)>> {
        let mut read_dir = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            MigrateError::SourceUnavailable(format!(
                "failed to list {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut entries = Vec::new();
        loop {
            let entry = read_dir.next_entry().await.map_err(|e| {
                MigrateError::SourceUnavailable(format!(
                    "failed to list {}: {}",
                    self.dir.display(),
                    e
                ))
            })?;
            let Some(entry) = entry else { break };

            let path = entry.path();
            let Some(id) = identifier_for(&path)? else {
                continue;
            };

            // Follows symlinks, so linked scripts count as files
            let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
                MigrateError::SourceUnavailable(format!(
                    "failed to stat {}: {}",
                    path.display(),
                    e
                ))
            })?;
            if !metadata.is_file() {
                continue;
            }

            entries.push((id, path));
        }

        Ok(entries)
    }
}

/// Identifier of a migration file, or `None` for hidden entries.
///
/// Only the final extension is stripped: `m1.up.sql` is the migration `m1.up`.
/// Names that are not valid UTF-8 cannot become identifiers and are rejected.
fn identifier_for(path: &Path) -> Result<Option<MigrationId>> {
    let file_name = path.file_name().unwrap_or_default();
    let Some(file_name) = file_name.to_str() else {
        return Err(MigrateError::SourceUnavailable(format!(
            "migration file name {} is not valid UTF-8",
            path.display()
        )));
    };
    if file_name.starts_with('.') {
        return Ok(None);
    }

    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name);
    Ok(Some(MigrationId::new(stem)))
}

#[async_trait]
impl<C: ScriptExecutor + 'static> MigrationSource<C> for DirectorySource {
    async fn list_available(&self) -> Result<Vec<MigrationId>> {
        let ids = self.entries().await?.into_iter().map(|(id, _)| id).collect();
        let ids = sort_unique(ids)?;
        debug!(dir = %self.dir.display(), count = ids.len(), "listed migrations");
        Ok(ids)
    }

    async fn load(&self, id: &MigrationId) -> Result<Arc<dyn Migration<C>>> {
        let path = self
            .entries()
            .await?
            .into_iter()
            .find(|(entry_id, _)| entry_id == id)
            .map(|(_, path)| path)
            .ok_or_else(|| MigrateError::not_found(id))?;

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            MigrateError::SourceUnavailable(format!("failed to read {}: {}", path.display(), e))
        })?;

        Ok(Arc::new(ScriptMigration::parse(id, &content)?))
    }
}

#[async_trait]
impl WritableSource for DirectorySource {
    async fn write_skeleton(&self, id: &MigrationId) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            MigrateError::SourceWrite(format!(
                "failed to create {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let path = self.path_for(id);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                MigrateError::SourceWrite(format!("failed to create {}: {}", path.display(), e))
            })?;

        file.write_all(SKELETON.as_bytes()).await.map_err(|e| {
            MigrateError::SourceWrite(format!("failed to write {}: {}", path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            MigrateError::SourceWrite(format!("failed to sync {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), "wrote migration skeleton");
        Ok(())
    }
}
