//! Custom error types for the common library
//!
//! This module defines the infrastructure error types shared by the store
//! and both services.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Error raised while loading or validating service settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The layered configuration could not be read or deserialized
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was read but is not acceptable
    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}
