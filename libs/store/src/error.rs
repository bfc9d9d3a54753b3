//! Store error taxonomy
//!
//! Every expected failure of a store operation is reported as one of these
//! variants; callers branch on the variant rather than on message text.

use common::error::DatabaseError;
use thiserror::Error;
use tracing::error;

/// SQLSTATE raised when a serializable transaction must be retried
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE raised when the engine breaks a deadlock
const DEADLOCK_DETECTED: &str = "40P01";

/// Error type for store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Malformed identifier or missing/out-of-range input
    #[error("{0}")]
    Validation(String),

    /// No record matches a direct lookup
    #[error("could not find {entity} with {field} {value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// Duplicate natural key, or a delete blocked by existing references
    #[error("{0}")]
    Conflict(String),

    /// The backing engine was unreachable, timed out, or aborted the
    /// operation; retrying may succeed
    #[error("backing store unavailable: {0}")]
    TransientIo(String),

    /// A stored record violated a decode invariant
    #[error("internal store error: {0}")]
    Internal(String),
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }

    /// Whether retrying the same operation may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientIo(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return Self::Conflict(db_err.message().to_string());
                }
                match db_err.code().as_deref() {
                    Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => {
                        Self::TransientIo(db_err.message().to_string())
                    }
                    _ => {
                        error!("Unexpected database error: {}", err);
                        Self::Internal(err.to_string())
                    }
                }
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::TransientIo(err.to_string()),
            _ => {
                error!("Failed to decode stored record: {}", err);
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Connection(e) => e.into(),
            DatabaseError::Configuration(msg) => Self::Internal(msg),
        }
    }
}

/// Map a unique-index violation to a [`StoreError::Conflict`] carrying
/// `message`, and any other failure through the generic mapping
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: impl FnOnce() -> String) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(message());
        }
    }
    err.into()
}
