//! Script migrations.
//!
//! A script file holds both transformations, split by marker lines:
//!
//! ```text
//! -- migrate:up
//! CREATE TABLE users (id INTEGER PRIMARY KEY);
//!
//! -- migrate:down
//! DROP TABLE users;
//! ```
//!
//! Text before the first marker is ignored. A section holding only
//! whitespace and `--` comments succeeds without touching the connection.

use super::error::{BoxError, MigrateError, Result};
use super::id::MigrationId;
use super::source::Migration;
use crate::logger::Logger;
use async_trait::async_trait;

/// Marker line opening the forward section.
pub const UP_MARKER: &str = "-- migrate:up";

/// Marker line opening the reverse section.
pub const DOWN_MARKER: &str = "-- migrate:down";

/// Contents written for a freshly scaffolded migration.
pub const SKELETON: &str = "\
-- Migration created by stride.
-- Statements below the up marker apply the migration,
-- statements below the down marker revert it.

-- migrate:up


-- migrate:down

";

/// Connection capable of running a script section.
#[async_trait]
pub trait ScriptExecutor: Send {
    /// Execute one script section.
    async fn execute_script(&mut self, script: &str) -> std::result::Result<(), BoxError>;
}

/// Migration defined by an up and a down script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptMigration {
    up: String,
    down: String,
}

impl ScriptMigration {
    /// Create a script migration from its two sections.
    pub fn new(up: impl Into<String>, down: impl Into<String>) -> Self {
        Self {
            up: up.into(),
            down: down.into(),
        }
    }

    /// Parse a script file.
    pub fn parse(id: &MigrationId, content: &str) -> Result<Self> {
        enum Section {
            Preamble,
            Up,
            Down,
        }

        let mut section = Section::Preamble;
        let mut seen_up = false;
        let mut seen_down = false;
        let mut up = String::new();
        let mut down = String::new();

        for line in content.lines() {
            match line.trim() {
                UP_MARKER => {
                    if seen_up {
                        return Err(invalid(id, "duplicate up marker"));
                    }
                    seen_up = true;
                    section = Section::Up;
                }
                DOWN_MARKER => {
                    if seen_down {
                        return Err(invalid(id, "duplicate down marker"));
                    }
                    seen_down = true;
                    section = Section::Down;
                }
                _ => {
                    let target = match section {
                        Section::Preamble => continue,
                        Section::Up => &mut up,
                        Section::Down => &mut down,
                    };
                    target.push_str(line);
                    target.push('\n');
                }
            }
        }

        if !seen_up {
            return Err(invalid(id, "missing `-- migrate:up` marker"));
        }

        Ok(Self { up, down })
    }

    /// The forward section.
    pub fn up_script(&self) -> &str {
        &self.up
    }

    /// The reverse section.
    pub fn down_script(&self) -> &str {
        &self.down
    }
}

fn invalid(id: &MigrationId, reason: &str) -> MigrateError {
    MigrateError::InvalidMigration {
        id: id.clone(),
        reason: reason.to_string(),
    }
}

/// Check whether a section has nothing to execute.
pub fn is_blank(script: &str) -> bool {
    script
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}

#[async_trait]
impl<C: ScriptExecutor> Migration<C> for ScriptMigration {
    async fn up(&self, conn: &mut C, _logger: &dyn Logger) -> std::result::Result<(), BoxError> {
        if is_blank(&self.up) {
            return Ok(());
        }
        conn.execute_script(&self.up).await
    }

    async fn down(
        &self,
        conn: &mut C,
        _logger: &dyn Logger,
    ) -> std::result::Result<(), BoxError> {
        if is_blank(&self.down) {
            return Ok(());
        }
        conn.execute_script(&self.down).await
    }
}

#[async_trait]
impl ScriptExecutor for rusqlite::Connection {
    async fn execute_script(&mut self, script: &str) -> std::result::Result<(), BoxError> {
        self.execute_batch(script)?;
        Ok(())
    }
}
