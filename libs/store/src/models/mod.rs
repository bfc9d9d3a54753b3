//! Store models
//!
//! Each entity has an input type for creation, an `Option`-per-field patch
//! type for partial updates, and a denormalized read type.

pub mod author;
pub mod recipe;
pub mod session;
pub mod user;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

// Re-export for convenience
pub use author::{Author, AuthorPatch, AuthorProfile, NewAuthor};
pub use recipe::{AmountUnit, Category, Ingredient, NewRecipe, PrepStep, Recipe, RecipePatch};
pub use session::{NewSession, Session};
pub use user::{NewUser, Role, User, UserPatch, UserSnapshot};

/// A stored text value did not name any variant of an enum
#[derive(Error, Debug)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl From<UnknownVariant> for StoreError {
    fn from(err: UnknownVariant) -> Self {
        StoreError::Internal(err.to_string())
    }
}

/// Parse the textual form of an identifier
pub fn parse_id(entity: &'static str, raw: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| StoreError::Validation(format!("failed to parse {} id {}", entity, raw)))
}

/// Fail with a validation error when a natural key is blank
pub(crate) fn require_key(entity: &'static str, field: &'static str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!(
            "{} {} must not be empty",
            entity, field
        )));
    }
    Ok(())
}

/// Next modification timestamp, strictly after `previous`
pub(crate) fn next_modified(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_canonical_uuid() {
        let id = Uuid::now_v7();
        assert_eq!(parse_id("user", &id.to_string()).unwrap(), id);
    }

    #[test]
    fn parse_id_rejects_garbage() {
        for raw in ["", "42", "65f1c0ffee", "not-an-id"] {
            assert!(matches!(
                parse_id("author", raw),
                Err(StoreError::Validation(_))
            ));
        }
    }

    #[test]
    fn blank_keys_are_rejected() {
        assert!(require_key("recipe", "name", "  ").is_err());
        assert!(require_key("recipe", "name", "Pancakes").is_ok());
    }

    #[test]
    fn next_modified_always_advances() {
        let future = Utc::now() + TimeDelta::hours(1);
        assert!(next_modified(future) > future);

        let past = Utc::now() - TimeDelta::hours(1);
        assert!(next_modified(past) > past);
    }
}
