//! In-code migration registry.
//!
//! Maps identifiers to migration values compiled into the program, for
//! backends whose migrations are not scripts.

use super::error::{MigrateError, Result};
use super::id::MigrationId;
use super::source::{Migration, MigrationSource};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Source backed by migrations registered in code.
pub struct MigrationRegistry<C> {
    entries: BTreeMap<MigrationId, Arc<dyn Migration<C>>>,
}

impl<C: Send> MigrationRegistry<C> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register a migration, replacing any previous entry with the same id.
    pub fn register(
        &mut self,
        id: impl Into<MigrationId>,
        migration: impl Migration<C> + 'static,
    ) -> &mut Self {
        self.entries.insert(id.into(), Arc::new(migration));
        self
    }

    /// Builder form of [`MigrationRegistry::register`].
    pub fn with_migration(
        mut self,
        id: impl Into<MigrationId>,
        migration: impl Migration<C> + 'static,
    ) -> Self {
        self.register(id, migration);
        self
    }

    /// Number of registered migrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check whether `id` is registered.
    pub fn contains(&self, id: &MigrationId) -> bool {
        self.entries.contains_key(id)
    }
}

impl<C: Send> Default for MigrationRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<C: Send + 'static> MigrationSource<C> for MigrationRegistry<C> {
    async fn list_available(&self) -> Result<Vec<MigrationId>> {
        Ok(self.entries.keys().cloned().collect())
    }

    async fn load(&self, id: &MigrationId) -> Result<Arc<dyn Migration<C>>> {
        self.entries
            .get(id)
            .cloned()
            .ok_or_else(|| MigrateError::not_found(id))
    }
}
