use sqlx::Error as SqlxError;
use std::time::Duration;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum GuessError {
    #[error("username already taken: {0}")]
    DuplicateUsername(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Password hashing failed: {0}")]
    HashingFailure(String),

    #[error("Password hashing timed out after {0:?}")]
    HashingTimeout(Duration),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] SqlxError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),
}

impl GuessError {
    pub(crate) fn game_not_found(id: i64) -> Self {
        GuessError::NotFound { entity: "game", id }
    }

    pub(crate) fn account_not_found(id: i64) -> Self {
        GuessError::NotFound {
            entity: "account",
            id,
        }
    }
}

impl From<argon2::password_hash::Error> for GuessError {
    fn from(e: argon2::password_hash::Error) -> Self {
        GuessError::HashingFailure(e.to_string())
    }
}

/// Whether `e` is SQLite rejecting a row for a UNIQUE constraint.
pub(crate) fn is_unique_violation(e: &SqlxError) -> bool {
    matches!(e, SqlxError::Database(db_err) if db_err.is_unique_violation())
}

/// Whether `e` is SQLite rejecting a row for a missing parent.
pub(crate) fn is_foreign_key_violation(e: &SqlxError) -> bool {
    matches!(e, SqlxError::Database(db_err) if db_err.is_foreign_key_violation())
}
