//! Todo store error types.

use thiserror::Error;

/// Errors that can occur during todo store operations.
///
/// "Not found" is never an error: operations report it in-band as `false`
/// or `None`.
#[derive(Debug, Error)]
pub enum TodoStoreError {
    /// A todo list with this title already exists for the user.
    #[error("Todo list title already exists: {title}")]
    DuplicateTitle { title: String },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Password hash could not be checked.
    #[error("Credential error: {0}")]
    Credential(#[from] bcrypt::BcryptError),

    /// A blocking task failed to complete.
    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TodoStoreError {
    /// Creates a duplicate title error.
    pub fn duplicate_title(title: impl Into<String>) -> Self {
        Self::DuplicateTitle {
            title: title.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Returns true if the error is the store rejecting a row that violates a
/// unique constraint.
///
/// Classification uses the driver's structured error kind, which maps the
/// Postgres `23505` SQLSTATE and the SQLite `SQLITE_CONSTRAINT_UNIQUE` /
/// `SQLITE_CONSTRAINT_PRIMARYKEY` extended codes.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => {
            matches!(db_error.kind(), sqlx::error::ErrorKind::UniqueViolation)
        }
        _ => false,
    }
}

/// Result type for todo store operations.
pub type TodoStoreResult<T> = Result<T, TodoStoreError>;
