//! Token error types

use thiserror::Error;

/// Errors raised while issuing or verifying tokens
#[derive(Error, Debug)]
pub enum TokenError {
    /// The symmetric secret does not have the required length
    #[error("invalid key size: must be exactly {expected} bytes, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    /// The requested lifetime does not yield a representable expiry
    #[error("token lifetime is out of range")]
    InvalidDuration,

    /// The token is malformed or failed authentication
    #[error("token is invalid")]
    InvalidToken,

    /// The token authenticated but its expiry has passed
    #[error("token has expired")]
    ExpiredToken,

    /// The claims could not be signed
    #[error("failed to encode token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}
