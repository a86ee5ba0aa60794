//! sled backend.
//!
//! Migrations receive the `sled::Db` itself; the applied record lives in a
//! dedicated tree of the same database.
//!
//! Key format: `[seq (8 bytes, big-endian)]`
//!
//! Big-endian sequence numbers make tree order equal application order.
//! Values are rkyv-encoded [`AppliedRecord`]s.

use crate::migration::error::{MigrateError, Result};
use crate::migration::{MigrateAdapter, MigrationId};
use async_trait::async_trait;
use rkyv::{Archive, Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A persisted applied-migration entry.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct AppliedRecord {
    /// Migration identifier.
    pub id: String,
    /// When the migration was recorded (microseconds since epoch).
    pub applied_at: i64,
}

impl AppliedRecord {
    /// Create a record stamped with the current time.
    pub fn now(id: &MigrationId) -> Self {
        Self {
            id: id.as_str().to_string(),
            applied_at: chrono::Utc::now().timestamp_micros(),
        }
    }

    /// Serialize the record to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| MigrateError::BackendWrite(format!("failed to encode record: {}", e)))
    }

    /// Deserialize a record from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut aligned = rkyv::util::AlignedVec::<16>::new();
        aligned.extend_from_slice(bytes);
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(&aligned)
            .map_err(|e| MigrateError::BackendRead(format!("failed to decode record: {}", e)))
    }
}

/// Backend storing the applied record in a sled tree.
#[derive(Debug, Clone)]
pub struct SledAdapter {
    path: PathBuf,
}

impl SledAdapter {
    /// Tree name for the applied record.
    pub const TREE_NAME: &'static str = "stride:applied";

    /// Create an adapter for the sled database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tree(db: &sled::Db) -> std::result::Result<sled::Tree, sled::Error> {
        db.open_tree(Self::TREE_NAME)
    }

    /// Applied records in application order.
    pub fn records(db: &sled::Db) -> Result<Vec<AppliedRecord>> {
        let read_err = |e: sled::Error| MigrateError::BackendRead(e.to_string());
        let tree = Self::tree(db).map_err(read_err)?;

        let mut records = Vec::new();
        for result in tree.iter() {
            let (_, value) = result.map_err(read_err)?;
            records.push(AppliedRecord::from_bytes(&value)?);
        }
        Ok(records)
    }

    fn next_seq(tree: &sled::Tree) -> Result<u64> {
        let last = tree
            .last()
            .map_err(|e| MigrateError::BackendWrite(e.to_string()))?;
        match last {
            Some((key, _)) => decode_seq(&key).map(|seq| seq + 1).ok_or_else(|| {
                MigrateError::BackendWrite(format!(
                    "unexpected key of {} bytes in {}",
                    key.len(),
                    Self::TREE_NAME
                ))
            }),
            None => Ok(0),
        }
    }
}

fn decode_seq(key: &[u8]) -> Option<u64> {
    let bytes: [u8; 8] = key.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}

#[async_trait]
impl MigrateAdapter for SledAdapter {
    type Connection = sled::Db;

    async fn connect(&mut self) -> Result<sled::Db> {
        let db = sled::open(&self.path).map_err(|e| {
            MigrateError::Connection(format!("failed to open {}: {}", self.path.display(), e))
        })?;
        Self::tree(&db).map_err(|e| {
            MigrateError::Connection(format!("failed to open tree {}: {}", Self::TREE_NAME, e))
        })?;
        debug!(path = %self.path.display(), "sled backend connected");
        Ok(db)
    }

    async fn close_connection(&mut self, conn: sled::Db) {
        if let Err(e) = conn.flush() {
            warn!(error = %e, path = %self.path.display(), "failed to flush sled database");
        }
    }

    async fn get_applied(&mut self, conn: &mut sled::Db) -> Result<Vec<MigrationId>> {
        Ok(Self::records(conn)?
            .into_iter()
            .map(|record| MigrationId::new(record.id))
            .collect())
    }

    async fn add_applied(&mut self, conn: &mut sled::Db, id: &MigrationId) -> Result<()> {
        let write_err = |e: sled::Error| MigrateError::BackendWrite(e.to_string());
        let tree = Self::tree(conn).map_err(write_err)?;

        let seq = Self::next_seq(&tree)?;
        let value = AppliedRecord::now(id).to_bytes()?;
        tree.insert(seq.to_be_bytes(), value).map_err(write_err)?;
        tree.flush().map_err(write_err)?;

        debug!(%id, seq, "recorded applied migration");
        Ok(())
    }

    async fn remove_applied(&mut self, conn: &mut sled::Db, id: &MigrationId) -> Result<()> {
        let write_err = |e: sled::Error| MigrateError::BackendWrite(e.to_string());
        let tree = Self::tree(conn).map_err(write_err)?;

        let mut found = None;
        for result in tree.iter() {
            let (key, value) = result.map_err(write_err)?;
            if AppliedRecord::from_bytes(&value)?.id == id.as_str() {
                found = Some(key);
                break;
            }
        }

        let key = found.ok_or_else(|| MigrateError::not_found(id))?;
        tree.remove(key).map_err(write_err)?;
        tree.flush().map_err(write_err)?;

        debug!(%id, "removed applied migration");
        Ok(())
    }
}
