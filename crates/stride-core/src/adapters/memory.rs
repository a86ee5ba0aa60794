//! In-memory backend.
//!
//! Keeps the applied record in shared memory. Clones of a [`MemoryAdapter`]
//! share the same state, so a caller can keep one handle and inspect the
//! record after handing another to the engine.

use crate::migration::error::{BoxError, MigrateError, Result};
use crate::migration::{MigrateAdapter, MigrationId, ScriptExecutor};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct MemoryState {
    applied: Vec<MigrationId>,
    executed: Vec<String>,
    connected: bool,
    connects: usize,
    closes: usize,
    unreachable: bool,
    read_only: bool,
}

/// Backend holding the applied record in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdapter {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryAdapter {
    /// Create an adapter with an empty applied record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an adapter whose record already holds `applied`, oldest first.
    pub fn with_applied(applied: Vec<MigrationId>) -> Self {
        let adapter = Self::new();
        adapter.state.lock().applied = applied;
        adapter
    }

    /// Snapshot of the applied record, oldest first.
    pub fn applied(&self) -> Vec<MigrationId> {
        self.state.lock().applied.clone()
    }

    /// Scripts executed by closed connections, in order.
    pub fn executed(&self) -> Vec<String> {
        self.state.lock().executed.clone()
    }

    /// Whether a connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    /// Number of successful connects.
    pub fn connect_count(&self) -> usize {
        self.state.lock().connects
    }

    /// Number of closes.
    pub fn close_count(&self) -> usize {
        self.state.lock().closes
    }

    /// Make `connect` fail.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unreachable = unreachable;
    }

    /// Make writes to the applied record fail.
    pub fn set_read_only(&self, read_only: bool) {
        self.state.lock().read_only = read_only;
    }
}

/// Connection handed out by [`MemoryAdapter`].
#[derive(Debug, Default)]
pub struct MemoryConnection {
    executed: Vec<String>,
}

impl MemoryConnection {
    /// Scripts executed on this connection.
    pub fn executed(&self) -> &[String] {
        &self.executed
    }
}

#[async_trait]
impl ScriptExecutor for MemoryConnection {
    async fn execute_script(&mut self, script: &str) -> std::result::Result<(), BoxError> {
        self.executed.push(script.to_string());
        Ok(())
    }
}

#[async_trait]
impl MigrateAdapter for MemoryAdapter {
    type Connection = MemoryConnection;

    async fn connect(&mut self) -> Result<MemoryConnection> {
        let mut state = self.state.lock();
        if state.unreachable {
            return Err(MigrateError::Connection(
                "memory backend is unreachable".to_string(),
            ));
        }
        state.connected = true;
        state.connects += 1;
        Ok(MemoryConnection::default())
    }

    async fn close_connection(&mut self, conn: MemoryConnection) {
        let mut state = self.state.lock();
        state.executed.extend(conn.executed);
        state.connected = false;
        state.closes += 1;
    }

    async fn get_applied(&mut self, _conn: &mut MemoryConnection) -> Result<Vec<MigrationId>> {
        Ok(self.state.lock().applied.clone())
    }

    async fn add_applied(&mut self, _conn: &mut MemoryConnection, id: &MigrationId) -> Result<()> {
        let mut state = self.state.lock();
        if state.read_only {
            return Err(MigrateError::BackendWrite(format!(
                "memory backend is read-only, cannot record {}",
                id
            )));
        }
        state.applied.push(id.clone());
        Ok(())
    }

    async fn remove_applied(
        &mut self,
        _conn: &mut MemoryConnection,
        id: &MigrationId,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if state.read_only {
            return Err(MigrateError::BackendWrite(format!(
                "memory backend is read-only, cannot remove {}",
                id
            )));
        }
        let position = state
            .applied
            .iter()
            .position(|applied| applied == id)
            .ok_or_else(|| MigrateError::not_found(id))?;
        state.applied.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_applied_lifecycle() {
        let mut adapter = MemoryAdapter::new();
        let mut conn = adapter.connect().await.unwrap();
        assert!(adapter.is_connected());

        let m1 = MigrationId::new("m1");
        let m2 = MigrationId::new("m2");
        adapter.add_applied(&mut conn, &m1).await.unwrap();
        adapter.add_applied(&mut conn, &m2).await.unwrap();
        assert_eq!(adapter.get_applied(&mut conn).await.unwrap(), vec![m1.clone(), m2.clone()]);

        adapter.remove_applied(&mut conn, &m1).await.unwrap();
        assert_eq!(adapter.applied(), vec![m2]);

        adapter.close_connection(conn).await;
        assert!(!adapter.is_connected());
        assert_eq!(adapter.connect_count(), 1);
        assert_eq!(adapter.close_count(), 1);
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let mut adapter = MemoryAdapter::new();
        let mut conn = adapter.connect().await.unwrap();
        let result = adapter.remove_applied(&mut conn, &MigrationId::new("m1")).await;
        assert!(matches!(result, Err(MigrateError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let mut adapter = MemoryAdapter::new();
        adapter.set_unreachable(true);
        assert!(matches!(
            adapter.connect().await,
            Err(MigrateError::Connection(_))
        ));

        adapter.set_unreachable(false);
        adapter.set_read_only(true);
        let mut conn = adapter.connect().await.unwrap();
        let result = adapter.add_applied(&mut conn, &MigrationId::new("m1")).await;
        assert!(matches!(result, Err(MigrateError::BackendWrite(_))));
    }

    #[tokio::test]
    async fn test_executed_scripts_collected_on_close() {
        let mut adapter = MemoryAdapter::new();
        let mut conn = adapter.connect().await.unwrap();
        conn.execute_script("CREATE TABLE t;").await.unwrap();
        assert_eq!(conn.executed(), &["CREATE TABLE t;".to_string()]);

        adapter.close_connection(conn).await;
        assert_eq!(adapter.executed(), vec!["CREATE TABLE t;".to_string()]);
    }
}
