//! Persistence gateway shared by every backing adapter

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::StoreResult,
    models::{
        Author, AuthorPatch, NewAuthor, NewRecipe, NewSession, NewUser, Recipe, RecipePatch,
        Session, User, UserPatch,
    },
    pagination::Pagination,
};

/// Create, read, update and delete operations for the catalog entities.
///
/// Identifiers are accepted in their textual form; a malformed identifier is
/// reported as [`StoreError::Validation`](crate::StoreError::Validation).
/// Reads of authors, recipes and sessions embed snapshots of the records they
/// reference in place of the raw foreign ids.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<Uuid>;
    async fn get_all_users(&self, pagination: Pagination) -> StoreResult<Vec<User>>;
    async fn get_user_by_email(&self, email: &str) -> StoreResult<User>;
    async fn get_user_by_id(&self, id: &str) -> StoreResult<User>;
    /// Returns 1 when the user existed, 0 otherwise
    async fn update_user_by_id(&self, id: &str, patch: UserPatch) -> StoreResult<u64>;
    /// Fails with a conflict while any author or recipe belongs to the user
    async fn delete_user_by_id(&self, id: &str) -> StoreResult<u64>;

    async fn create_author(&self, author: NewAuthor) -> StoreResult<Uuid>;
    async fn get_all_authors(&self, pagination: Pagination) -> StoreResult<Vec<Author>>;
    async fn get_author_by_id(&self, id: &str) -> StoreResult<Author>;
    async fn update_author_by_id(&self, id: &str, patch: AuthorPatch) -> StoreResult<u64>;
    /// Fails with a conflict while any recipe is attributed to the author
    async fn delete_author_by_id(&self, id: &str) -> StoreResult<u64>;

    async fn create_recipe(&self, recipe: NewRecipe) -> StoreResult<Uuid>;
    async fn get_all_recipes(&self, pagination: Pagination) -> StoreResult<Vec<Recipe>>;
    async fn get_recipe_by_id(&self, id: &str) -> StoreResult<Recipe>;
    async fn update_recipe_by_id(&self, id: &str, patch: RecipePatch) -> StoreResult<u64>;
    async fn delete_recipe_by_id(&self, id: &str) -> StoreResult<u64>;

    async fn create_session(&self, session: NewSession) -> StoreResult<Uuid>;
    async fn get_session_by_id(&self, id: &str) -> StoreResult<Session>;
}
