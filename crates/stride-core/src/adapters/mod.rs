//! Backend adapters for the applied-migration record.
//!
//! - [`MemoryAdapter`]: in-process, for tests and embedding
//! - [`SqliteAdapter`]: bookkeeping table in a SQLite database
//! - [`SledAdapter`]: dedicated tree in a sled database

pub mod memory;
pub mod sled;
pub mod sqlite;

pub use memory::{MemoryAdapter, MemoryConnection};
pub use self::sled::{AppliedRecord, SledAdapter};
pub use sqlite::{validate_table_name, SqliteAdapter, DEFAULT_TABLE};
