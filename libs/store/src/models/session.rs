//! Session model

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::UserSnapshot;

/// One issued refresh grant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub refresh_token: String,
    pub user_agent: String,
    pub client_ip: String,
    pub is_blocked: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub user: Option<UserSnapshot>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// New session creation payload
#[derive(Debug, Clone)]
pub struct NewSession {
    /// Identifier chosen by the caller, usually the refresh token's id
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub refresh_token: String,
    pub user_agent: String,
    pub client_ip: String,
    pub is_blocked: bool,
    pub expires_at: DateTime<Utc>,
}
