//! SQLite backend.
//!
//! Migrations run as SQL scripts on a `rusqlite::Connection`; the applied
//! record is a bookkeeping table in the same database. Application order is
//! the order of the table's autoincrement `seq` column.

use crate::migration::error::{MigrateError, Result};
use crate::migration::{MigrateAdapter, MigrationId};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default name of the bookkeeping table.
pub const DEFAULT_TABLE: &str = "stride_migrations";

/// Backend storing the applied record in a SQLite table.
#[derive(Debug, Clone)]
pub struct SqliteAdapter {
    path: PathBuf,
    table: String,
}

impl SqliteAdapter {
    /// Create an adapter for the database file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: DEFAULT_TABLE.to_string(),
        }
    }

    /// Set the bookkeeping table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bookkeeping table name.
    pub fn table(&self) -> &str {
        &self.table
    }
}

/// Check that `name` is a plain SQL identifier.
pub fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(MigrateError::Config(format!(
            "invalid bookkeeping table name {:?}",
            name
        )))
    }
}

#[async_trait]
impl MigrateAdapter for SqliteAdapter {
    type Connection = Connection;

    async fn connect(&mut self) -> Result<Connection> {
        validate_table_name(&self.table)?;

        let conn = Connection::open(&self.path).map_err(|e| {
            MigrateError::Connection(format!("failed to open {}: {}", self.path.display(), e))
        })?;

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                applied_at TEXT NOT NULL
            );",
            self.table
        ))
        .map_err(|e| {
            MigrateError::Connection(format!("failed to prepare table {}: {}", self.table, e))
        })?;

        debug!(path = %self.path.display(), table = %self.table, "sqlite backend connected");
        Ok(conn)
    }

    async fn close_connection(&mut self, conn: Connection) {
        if let Err((_, e)) = conn.close() {
            warn!(error = %e, path = %self.path.display(), "failed to close sqlite connection");
        }
    }

    async fn get_applied(&mut self, conn: &mut Connection) -> Result<Vec<MigrationId>> {
        let read_err = |e: rusqlite::Error| MigrateError::BackendRead(e.to_string());

        let mut stmt = conn
            .prepare(&format!("SELECT id FROM {} ORDER BY seq", self.table))
            .map_err(read_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(read_err)?;

        let mut applied = Vec::new();
        for row in rows {
            applied.push(MigrationId::new(row.map_err(read_err)?));
        }
        Ok(applied)
    }

    async fn add_applied(&mut self, conn: &mut Connection, id: &MigrationId) -> Result<()> {
        let applied_at = chrono::Utc::now().to_rfc3339();
        conn.execute(
            &format!("INSERT INTO {} (id, applied_at) VALUES (?1, ?2)", self.table),
            params![id.as_str(), applied_at],
        )
        .map_err(|e| MigrateError::BackendWrite(format!("failed to record {}: {}", id, e)))?;
        debug!(%id, "recorded applied migration");
        Ok(())
    }

    async fn remove_applied(&mut self, conn: &mut Connection, id: &MigrationId) -> Result<()> {
        let removed = conn
            .execute(
                &format!("DELETE FROM {} WHERE id = ?1", self.table),
                params![id.as_str()],
            )
            .map_err(|e| MigrateError::BackendWrite(format!("failed to remove {}: {}", id, e)))?;

        if removed == 0 {
            return Err(MigrateError::not_found(id));
        }
        debug!(%id, "removed applied migration");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_applied_order_and_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        let mut adapter = SqliteAdapter::new(&path);

        let mut conn = adapter.connect().await.unwrap();
        for name in ["m3", "m1", "m2"] {
            adapter
                .add_applied(&mut conn, &MigrationId::new(name))
                .await
                .unwrap();
        }
        adapter.close_connection(conn).await;

        let mut conn = adapter.connect().await.unwrap();
        let applied = adapter.get_applied(&mut conn).await.unwrap();
        assert_eq!(
            applied,
            vec![
                MigrationId::new("m3"),
                MigrationId::new("m1"),
                MigrationId::new("m2")
            ]
        );
    }

    #[tokio::test]
    async fn test_remove_applied() {
        let dir = tempfile::tempdir().unwrap();
        let mut adapter = SqliteAdapter::new(dir.path().join("app.db"));
        let mut conn = adapter.connect().await.unwrap();

        let m1 = MigrationId::new("m1");
        adapter.add_applied(&mut conn, &m1).await.unwrap();
        adapter.remove_applied(&mut conn, &m1).await.unwrap();
        assert!(adapter.get_applied(&mut conn).await.unwrap().is_empty());

        let again = adapter.remove_applied(&mut conn, &m1).await;
        assert!(matches!(again, Err(MigrateError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_add_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut adapter = SqliteAdapter::new(dir.path().join("app.db"));
        let mut conn = adapter.connect().await.unwrap();

        let m1 = MigrationId::new("m1");
        adapter.add_applied(&mut conn, &m1).await.unwrap();
        let result = adapter.add_applied(&mut conn, &m1).await;
        assert!(matches!(result, Err(MigrateError::BackendWrite(_))));
    }

    #[tokio::test]
    async fn test_custom_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut adapter = SqliteAdapter::new(dir.path().join("app.db")).with_table("schema_log");
        let mut conn = adapter.connect().await.unwrap();
        adapter
            .add_applied(&mut conn, &MigrationId::new("m1"))
            .await
            .unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_log", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut adapter = SqliteAdapter::new(dir.path().join("missing/dir/app.db"));
        assert!(matches!(
            adapter.connect().await,
            Err(MigrateError::Connection(_))
        ));
    }

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("stride_migrations").is_ok());
        assert!(validate_table_name("_t1").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("1table").is_err());
        assert!(validate_table_name("t; DROP TABLE x").is_err());
    }
}
