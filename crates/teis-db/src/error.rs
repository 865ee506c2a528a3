//! # Database Errors
//!
//! ```text
//! sqlx::Error ──► DbError ──► ApiError (backoffice, printed by the launcher)
//! ```

use sqlx::error::ErrorKind;
use thiserror::Error;
use tracing::error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// UPDATE / DELETE matched no row, or a required row is missing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A national ID or product name that is already taken.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// An invoice for an unknown customer, or a line for an unknown invoice.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Snapshot, validation or copy of a backup file went wrong.
    #[error("Backup failed: {0}")]
    BackupFailed(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Attaches the rejected key to a unique violation; SQLite only names
    /// the column.
    pub(crate) fn with_value(self, value: impl Into<String>) -> Self {
        match self {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: value.into(),
            },
            other => other,
        }
    }
}

/// ```text
/// RowNotFound                    → NotFound
/// Database(UniqueViolation)      → UniqueViolation { field: "<table>.<column>" }
/// Database(ForeignKeyViolation)  → ForeignKeyViolation
/// Database(other)                → QueryFailed
/// PoolTimedOut / PoolClosed      → PoolExhausted / ConnectionFailed
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    // "UNIQUE constraint failed: customers.dni_nie"
                    ErrorKind::UniqueViolation => {
                        let field = message
                            .rsplit(": ")
                            .next()
                            .unwrap_or("unknown")
                            .to_string();
                        DbError::duplicate(field, "unknown")
                    }
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => {
                error!(error = %err, "Unexpected database error");
                DbError::Internal(err.to_string())
            }
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
