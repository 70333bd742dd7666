//! Database error types.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// A stored value could not be decoded into its domain type.
    #[error("corrupt {entity} {id}: {reason}")]
    Corrupt {
        entity: &'static str,
        id: String,
        reason: String,
    },
}

impl DatabaseError {
    /// Map a unique-constraint violation to [`DatabaseError::AlreadyExists`].
    pub(crate) fn from_insert(err: sqlx::Error, entity: &'static str, id: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity,
                    id: id.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
