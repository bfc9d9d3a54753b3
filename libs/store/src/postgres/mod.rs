//! PostgreSQL store adapter

mod authors;
mod recipes;
mod schema;
mod sessions;
mod users;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Row, Transaction, postgres::PgRow};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::{
    deadline::{DEFAULT_OPERATION_TIMEOUT, within},
    error::StoreResult,
    integrity::{Reference, ReferenceCounter},
    models::{
        Author, AuthorPatch, NewAuthor, NewRecipe, NewSession, NewUser, Recipe, RecipePatch,
        Session, User, UserPatch, UserSnapshot,
    },
    pagination::Pagination,
    store::Store,
};

/// Store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    operation_timeout: Duration,
}

impl PgStore {
    /// Create a new store, installing the schema if it is missing
    pub async fn new(pool: PgPool) -> StoreResult<Self> {
        schema::install(&pool).await?;
        info!("Store schema ready");

        Ok(Self {
            pool,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        })
    }

    /// Override the deadline applied to each operation
    pub fn with_operation_timeout(mut self, operation_timeout: Duration) -> Self {
        self.operation_timeout = operation_timeout;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Open a transaction running at SERIALIZABLE isolation
async fn begin_serializable(pool: &PgPool) -> StoreResult<Transaction<'static, Postgres>> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

/// Owner snapshot from a LEFT JOIN; absent when the owner no longer exists
fn user_snapshot(row: &PgRow, id_column: &str, email_column: &str) -> StoreResult<Option<UserSnapshot>> {
    let id: Option<Uuid> = row.try_get(id_column)?;
    let email: Option<String> = row.try_get(email_column)?;
    Ok(id.zip(email).map(|(id, email)| UserSnapshot { id, email }))
}

#[async_trait]
impl ReferenceCounter for PgConnection {
    async fn count_references(&mut self, reference: Reference, target: Uuid) -> StoreResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = $1",
            reference.collection(),
            reference.field()
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(target)
            .fetch_one(&mut *self)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<Uuid> {
        within(self.operation_timeout, "create_user", users::create(&self.pool, user)).await
    }

    async fn get_all_users(&self, pagination: Pagination) -> StoreResult<Vec<User>> {
        within(
            self.operation_timeout,
            "get_all_users",
            users::get_all(&self.pool, pagination),
        )
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<User> {
        within(
            self.operation_timeout,
            "get_user_by_email",
            users::get_by_email(&self.pool, email),
        )
        .await
    }

    async fn get_user_by_id(&self, id: &str) -> StoreResult<User> {
        within(self.operation_timeout, "get_user_by_id", users::get_by_id(&self.pool, id)).await
    }

    async fn update_user_by_id(&self, id: &str, patch: UserPatch) -> StoreResult<u64> {
        within(
            self.operation_timeout,
            "update_user_by_id",
            users::update_by_id(&self.pool, id, patch),
        )
        .await
    }

    async fn delete_user_by_id(&self, id: &str) -> StoreResult<u64> {
        within(
            self.operation_timeout,
            "delete_user_by_id",
            users::delete_by_id(&self.pool, id),
        )
        .await
    }

    async fn create_author(&self, author: NewAuthor) -> StoreResult<Uuid> {
        within(self.operation_timeout, "create_author", authors::create(&self.pool, author)).await
    }

    async fn get_all_authors(&self, pagination: Pagination) -> StoreResult<Vec<Author>> {
        within(
            self.operation_timeout,
            "get_all_authors",
            authors::get_all(&self.pool, pagination),
        )
        .await
    }

    async fn get_author_by_id(&self, id: &str) -> StoreResult<Author> {
        within(self.operation_timeout, "get_author_by_id", authors::get_by_id(&self.pool, id)).await
    }

    async fn update_author_by_id(&self, id: &str, patch: AuthorPatch) -> StoreResult<u64> {
        within(
            self.operation_timeout,
            "update_author_by_id",
            authors::update_by_id(&self.pool, id, patch),
        )
        .await
    }

    async fn delete_author_by_id(&self, id: &str) -> StoreResult<u64> {
        within(
            self.operation_timeout,
            "delete_author_by_id",
            authors::delete_by_id(&self.pool, id),
        )
        .await
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> StoreResult<Uuid> {
        within(self.operation_timeout, "create_recipe", recipes::create(&self.pool, recipe)).await
    }

    async fn get_all_recipes(&self, pagination: Pagination) -> StoreResult<Vec<Recipe>> {
        within(
            self.operation_timeout,
            "get_all_recipes",
            recipes::get_all(&self.pool, pagination),
        )
        .await
    }

    async fn get_recipe_by_id(&self, id: &str) -> StoreResult<Recipe> {
        within(self.operation_timeout, "get_recipe_by_id", recipes::get_by_id(&self.pool, id)).await
    }

    async fn update_recipe_by_id(&self, id: &str, patch: RecipePatch) -> StoreResult<u64> {
        within(
            self.operation_timeout,
            "update_recipe_by_id",
            recipes::update_by_id(&self.pool, id, patch),
        )
        .await
    }

    async fn delete_recipe_by_id(&self, id: &str) -> StoreResult<u64> {
        within(
            self.operation_timeout,
            "delete_recipe_by_id",
            recipes::delete_by_id(&self.pool, id),
        )
        .await
    }

    async fn create_session(&self, session: NewSession) -> StoreResult<Uuid> {
        within(self.operation_timeout, "create_session", sessions::create(&self.pool, session)).await
    }

    async fn get_session_by_id(&self, id: &str) -> StoreResult<Session> {
        within(
            self.operation_timeout,
            "get_session_by_id",
            sessions::get_by_id(&self.pool, id),
        )
        .await
    }
}
