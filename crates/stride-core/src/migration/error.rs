//! Migration-specific error types.

use super::id::MigrationId;
use thiserror::Error;

/// Boxed error returned by migration transformations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout the migration engine.
pub type Result<T> = std::result::Result<T, MigrateError>;

/// Migration errors.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The backend could not be reached or is misconfigured.
    #[error("connection error: {0}")]
    Connection(String),

    /// Reading the applied set failed.
    #[error("backend read error: {0}")]
    BackendRead(String),

    /// Recording or un-recording an applied migration failed.
    #[error("backend write error: {0}")]
    BackendWrite(String),

    /// The migration source could not be listed or read.
    #[error("migration source unavailable: {0}")]
    SourceUnavailable(String),

    /// Writing to the migration source failed.
    #[error("migration source write error: {0}")]
    SourceWrite(String),

    /// A migration transformation reported failure.
    #[error("migration {id} failed: {message}")]
    MigrationExecution {
        /// The migration whose transformation failed.
        id: MigrationId,
        /// Error reported by the transformation.
        message: String,
    },

    /// Migration not found in the source or the applied set.
    #[error("migration not found: {id}")]
    NotFound {
        /// The identifier that was looked up.
        id: MigrationId,
    },

    /// Two source entries resolve to the same identifier.
    #[error("duplicate migration identifier: {id}")]
    DuplicateMigration {
        /// The duplicated identifier.
        id: MigrationId,
    },

    /// A migration entry exists but cannot be turned into a migration.
    #[error("invalid migration {id}: {reason}")]
    InvalidMigration {
        /// The offending migration.
        id: MigrationId,
        /// Why it was rejected.
        reason: String,
    },

    /// A user-supplied migration name was rejected.
    #[error("invalid migration name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl MigrateError {
    /// Wrap a transformation failure for the given migration.
    pub fn execution(id: &MigrationId, err: BoxError) -> Self {
        MigrateError::MigrationExecution {
            id: id.clone(),
            message: err.to_string(),
        }
    }

    /// Build a not-found error for the given migration.
    pub fn not_found(id: &MigrationId) -> Self {
        MigrateError::NotFound { id: id.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MigrateError::MigrationExecution {
            id: MigrationId::new("m202401010000_users"),
            message: "table exists".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "migration m202401010000_users failed: table exists"
        );
    }

    #[test]
    fn test_execution_from_boxed_error() {
        let id = MigrationId::new("m1");
        let cause: BoxError = "boom".into();
        let err = MigrateError::execution(&id, cause);
        assert!(matches!(
            err,
            MigrateError::MigrationExecution { ref message, .. } if message == "boom"
        ));
    }

    #[test]
    fn test_invalid_name_display() {
        let err = MigrateError::InvalidName {
            name: "a b".to_string(),
            reason: "contains whitespace".to_string(),
        };
        assert!(err.to_string().contains("\"a b\""));
    }
}
