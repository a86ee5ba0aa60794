//! Backend adapter contract.
//!
//! An adapter knows how to reach a backend and how to keep the record of
//! applied migrations there. Any store implementing [`MigrateAdapter`] can be
//! plugged into the engine.

use super::error::Result;
use super::id::MigrationId;
use async_trait::async_trait;

/// Persistence contract for applied-migration records.
#[async_trait]
pub trait MigrateAdapter: Send {
    /// Connection handle passed to migrations.
    type Connection: Send + 'static;

    /// Establish connectivity. Fails with `Connection`.
    async fn connect(&mut self) -> Result<Self::Connection>;

    /// Release the handle.
    ///
    /// Best-effort: failures are logged, never returned. Taking the handle by
    /// value makes a second close impossible.
    async fn close_connection(&mut self, conn: Self::Connection);

    /// Applied identifiers in application order, oldest first.
    /// Fails with `BackendRead`.
    async fn get_applied(&mut self, conn: &mut Self::Connection) -> Result<Vec<MigrationId>>;

    /// Record `id` as applied. Durable once this returns.
    /// Fails with `BackendWrite`.
    async fn add_applied(&mut self, conn: &mut Self::Connection, id: &MigrationId) -> Result<()>;

    /// Remove `id` from the applied record.
    ///
    /// Fails with `NotFound` if `id` is not recorded and with `BackendWrite`
    /// when the store rejects the write.
    async fn remove_applied(
        &mut self,
        conn: &mut Self::Connection,
        id: &MigrationId,
    ) -> Result<()>;
}
