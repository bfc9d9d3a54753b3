//! Referential-integrity guard
//!
//! A record may only be deleted while no other record points at it. The
//! guard counts referencing rows through a [`ReferenceCounter`] so the same
//! rules apply to every backing adapter.

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// A foreign-key relation between two collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    /// `recipes.author_id` points at an author
    RecipeAuthor,
    /// `recipes.user_id` points at a user
    RecipeUser,
    /// `authors.user_id` points at a user
    AuthorUser,
}

/// Relations that must be empty before a user is deleted
pub const USER_REFERENCES: &[Reference] = &[Reference::RecipeUser, Reference::AuthorUser];

/// Relations that must be empty before an author is deleted
pub const AUTHOR_REFERENCES: &[Reference] = &[Reference::RecipeAuthor];

impl Reference {
    /// Collection holding the foreign key
    pub fn collection(&self) -> &'static str {
        match self {
            Reference::RecipeAuthor | Reference::RecipeUser => "recipes",
            Reference::AuthorUser => "authors",
        }
    }

    /// Foreign-key field within [`Reference::collection`]
    pub fn field(&self) -> &'static str {
        match self {
            Reference::RecipeAuthor => "author_id",
            Reference::RecipeUser | Reference::AuthorUser => "user_id",
        }
    }

    fn target(&self) -> &'static str {
        match self {
            Reference::RecipeAuthor => "author",
            Reference::RecipeUser | Reference::AuthorUser => "user",
        }
    }

    fn referrer(&self) -> &'static str {
        match self {
            Reference::RecipeAuthor | Reference::RecipeUser => "recipe",
            Reference::AuthorUser => "author",
        }
    }
}

/// Counts records that reference a target through one relation
#[async_trait]
pub trait ReferenceCounter: Send {
    async fn count_references(&mut self, reference: Reference, target: Uuid) -> StoreResult<i64>;
}

/// Fail with [`StoreError::Conflict`] if any record references `target`
pub async fn check_referenced<C>(counter: &mut C, reference: Reference, target: Uuid) -> StoreResult<()>
where
    C: ReferenceCounter + ?Sized,
{
    let count = counter.count_references(reference, target).await?;
    if count > 0 {
        warn!(
            "Refusing to delete {} {}: {} {} still reference it",
            reference.target(),
            target,
            count,
            reference.collection()
        );
        return Err(StoreError::Conflict(format!(
            "can't delete {} because it is referenced in at least one {}",
            reference.target(),
            reference.referrer()
        )));
    }
    Ok(())
}

/// Run [`check_referenced`] for every relation in `references`
pub async fn check_all<C>(counter: &mut C, references: &[Reference], target: Uuid) -> StoreResult<()>
where
    C: ReferenceCounter + ?Sized,
{
    for reference in references {
        check_referenced(counter, *reference, target).await?;
    }
    Ok(())
}
