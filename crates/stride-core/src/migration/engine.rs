//! Migration engine - drives apply and rollback batches.
//!
//! Every top-level operation follows the same lifecycle:
//!
//! ```text
//! Idle -> Connected -> Reconciled -> Executing -> Closed
//! ```
//!
//! The connection is released on every exit path. A failed step aborts the
//! batch; steps that already completed stay applied (or rolled back) and are
//! visible in the applied set.

use super::adapter::MigrateAdapter;
use super::error::{MigrateError, Result};
use super::id::MigrationId;
use super::reconcile::{compute_pending, orphaned, select_apply, select_rollback};
use super::source::MigrationSource;
use crate::logger::Logger;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Compute and log batches without executing them.
    pub dry_run: bool,
}

impl EngineConfig {
    /// Enable or disable dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No connection held.
    Idle,
    /// Connection acquired.
    Connected,
    /// Available and applied sets have been read.
    Reconciled,
    /// A batch is running.
    Executing,
    /// Connection released.
    Closed {
        /// Whether the operation ended in an error.
        failed: bool,
    },
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Idle => write!(f, "idle"),
            EngineState::Connected => write!(f, "connected"),
            EngineState::Reconciled => write!(f, "reconciled"),
            EngineState::Executing => write!(f, "executing"),
            EngineState::Closed { failed: false } => write!(f, "closed"),
            EngineState::Closed { failed: true } => write!(f, "closed (failed)"),
        }
    }
}

/// Direction of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Applying pending migrations.
    Up,
    /// Rolling back applied migrations.
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Outcome of a successful batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Batch direction.
    pub direction: Direction,
    /// Migrations selected for the batch, in execution order.
    pub selected: Vec<MigrationId>,
    /// Migrations whose step completed.
    pub completed: Vec<MigrationId>,
    /// Whether the batch was only planned.
    pub dry_run: bool,
}

impl BatchReport {
    fn new(direction: Direction, selected: Vec<MigrationId>, dry_run: bool) -> Self {
        Self {
            direction,
            selected,
            completed: Vec::new(),
            dry_run,
        }
    }

    /// Check if the batch selected nothing.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

/// Migration engine over an adapter and a source.
pub struct MigrationEngine<A, S> {
    adapter: A,
    source: S,
    logger: Arc<dyn Logger>,
    config: EngineConfig,
    state: EngineState,
}

impl<A, S> MigrationEngine<A, S>
where
    A: MigrateAdapter,
    S: MigrationSource<A::Connection>,
{
    /// Create a new engine.
    pub fn new(adapter: A, source: S, logger: Arc<dyn Logger>, config: EngineConfig) -> Self {
        Self {
            adapter,
            source,
            logger,
            config,
            state: EngineState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The adapter.
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// The source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Log and return the pending migrations.
    pub async fn show_pending(&mut self) -> Result<Vec<MigrationId>> {
        let mut conn = self.connect().await?;
        let result = self.read_pending(&mut conn).await;
        if let Ok(pending) = &result {
            self.logger
                .info(&format!("{} pending migration(s) found", pending.len()));
            for id in pending {
                self.logger.info(id.as_str());
            }
        }
        self.finish(conn, result).await
    }

    /// Log the applied migrations, most recent first.
    ///
    /// Returns them in application order.
    pub async fn show_applied(&mut self) -> Result<Vec<MigrationId>> {
        let mut conn = self.connect().await?;
        let result = self.read_applied(&mut conn).await;
        if let Ok(applied) = &result {
            self.logger
                .info(&format!("{} applied migration(s) found", applied.len()));
            for id in applied.iter().rev() {
                self.logger.info(id.as_str());
            }
        }
        self.finish(conn, result).await
    }

    /// Apply up to `count` pending migrations in ascending order.
    ///
    /// `None` applies every pending migration.
    pub async fn migrate_up(&mut self, count: Option<usize>) -> Result<BatchReport> {
        let mut conn = self.connect().await?;
        let result = self.apply_batch(&mut conn, count).await;
        self.finish(conn, result).await
    }

    /// Roll back the `count` most recently applied migrations, newest first.
    pub async fn migrate_down(&mut self, count: usize) -> Result<BatchReport> {
        let mut conn = self.connect().await?;
        let result = self.rollback_batch(&mut conn, count).await;
        self.finish(conn, result).await
    }

    async fn connect(&mut self) -> Result<A::Connection> {
        match self.adapter.connect().await {
            Ok(conn) => {
                self.state = EngineState::Connected;
                debug!("migration backend connected");
                Ok(conn)
            }
            Err(e) => {
                self.state = EngineState::Idle;
                Err(e)
            }
        }
    }

    /// Release the connection and settle the terminal state.
    async fn finish<T>(&mut self, conn: A::Connection, result: Result<T>) -> Result<T> {
        self.adapter.close_connection(conn).await;
        self.state = EngineState::Closed {
            failed: result.is_err(),
        };
        debug!(state = %self.state, "migration backend closed");
        result
    }

    async fn read_applied(&mut self, conn: &mut A::Connection) -> Result<Vec<MigrationId>> {
        let applied = self.adapter.get_applied(conn).await?;
        self.state = EngineState::Reconciled;
        Ok(applied)
    }

    async fn read_pending(&mut self, conn: &mut A::Connection) -> Result<Vec<MigrationId>> {
        let available = self.source.list_available().await?;
        let applied = self.adapter.get_applied(conn).await?;

        for id in orphaned(&available, &applied) {
            self.logger.warn(&format!(
                "Applied migration {} is missing from the migration source",
                id
            ));
        }

        self.state = EngineState::Reconciled;
        Ok(compute_pending(&available, &applied))
    }

    async fn apply_batch(
        &mut self,
        conn: &mut A::Connection,
        count: Option<usize>,
    ) -> Result<BatchReport> {
        let pending = self.read_pending(conn).await?;
        let batch = select_apply(&pending, count);
        let mut report = BatchReport::new(Direction::Up, batch, self.config.dry_run);

        if report.is_empty() {
            self.logger.info("No migrations to apply");
            return Ok(report);
        }

        self.logger
            .info(&format!("{} migration(s) to apply", report.selected.len()));
        for id in &report.selected {
            self.logger.info(id.as_str());
        }

        if self.config.dry_run {
            for id in &report.selected {
                self.logger.info(&format!("Would apply {}", id));
            }
            return Ok(report);
        }

        self.state = EngineState::Executing;
        for id in report.selected.clone() {
            self.logger.info(&format!("Applying {}", id));
            if let Err(e) = self.apply_one(conn, &id).await {
                self.report_failure(&report, &id);
                return Err(e);
            }
            report.completed.push(id);
        }

        Ok(report)
    }

    async fn apply_one(&mut self, conn: &mut A::Connection, id: &MigrationId) -> Result<()> {
        let migration = self.source.load(id).await?;
        migration
            .up(conn, self.logger.as_ref())
            .await
            .map_err(|e| MigrateError::execution(id, e))?;
        self.adapter.add_applied(conn, id).await
    }

    async fn rollback_batch(
        &mut self,
        conn: &mut A::Connection,
        count: usize,
    ) -> Result<BatchReport> {
        let applied = self.read_applied(conn).await?;
        let batch = select_rollback(&applied, count);
        let mut report = BatchReport::new(Direction::Down, batch, self.config.dry_run);

        if report.is_empty() {
            self.logger.info("No migrations to roll back");
            return Ok(report);
        }

        self.logger
            .info(&format!("{} migration(s) to roll back", report.selected.len()));
        for id in &report.selected {
            self.logger.info(id.as_str());
        }

        if self.config.dry_run {
            for id in &report.selected {
                self.logger.info(&format!("Would roll back {}", id));
            }
            return Ok(report);
        }

        self.state = EngineState::Executing;
        for id in report.selected.clone() {
            self.logger.info(&format!("Rolling back {}", id));
            if let Err(e) = self.rollback_one(conn, &id).await {
                self.report_failure(&report, &id);
                return Err(e);
            }
            report.completed.push(id);
        }

        Ok(report)
    }

    async fn rollback_one(&mut self, conn: &mut A::Connection, id: &MigrationId) -> Result<()> {
        let migration = self.source.load(id).await?;
        migration
            .down(conn, self.logger.as_ref())
            .await
            .map_err(|e| MigrateError::execution(id, e))?;
        self.adapter.remove_applied(conn, id).await
    }

    fn report_failure(&self, report: &BatchReport, failed: &MigrationId) {
        let verb = match report.direction {
            Direction::Up => "apply",
            Direction::Down => "roll back",
        };
        self.logger.warn(&format!(
            "Failed to {} {} ({} of {} completed)",
            verb,
            failed,
            report.completed.len(),
            report.selected.len()
        ));
    }
}
