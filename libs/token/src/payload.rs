//! Token payload carried inside every issued token

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TokenError;

/// Verified contents of a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    /// Random id of this token instance
    pub id: Uuid,
    /// Authenticated identity the token was issued to
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Payload {
    /// Build a payload for `subject` valid for `ttl` from now
    ///
    /// Timestamps are kept at whole-second precision so that a payload
    /// survives encoding unchanged.
    pub fn new(subject: &str, ttl: TimeDelta) -> Result<Self, TokenError> {
        let issued_at = DateTime::from_timestamp(Utc::now().timestamp(), 0)
            .ok_or(TokenError::InvalidDuration)?;
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .and_then(|at| DateTime::from_timestamp(at.timestamp(), 0))
            .ok_or(TokenError::InvalidDuration)?;

        Ok(Self {
            id: Uuid::new_v4(),
            subject: subject.to_string(),
            issued_at,
            expires_at,
        })
    }

    /// Fail with [`TokenError::ExpiredToken`] once the expiry has passed
    pub fn validate(&self) -> Result<(), TokenError> {
        self.validate_at(Utc::now())
    }

    pub(crate) fn validate_at(&self, now: DateTime<Utc>) -> Result<(), TokenError> {
        if now > self.expires_at {
            return Err(TokenError::ExpiredToken);
        }
        Ok(())
    }
}
