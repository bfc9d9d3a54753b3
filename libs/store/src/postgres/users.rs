use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{info, warn};
use uuid::Uuid;

use super::begin_serializable;
use crate::{
    error::{StoreError, StoreResult, conflict_on_unique},
    integrity::{USER_REFERENCES, check_all},
    models::{NewUser, User, UserPatch, parse_id, require_key},
    pagination::{Pagination, SortKey},
};

const USER_COLUMNS: &str = "id, email, password_hash, role, is_active, created_at, modified_at";

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let role: String = row.try_get("role")?;

    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: role.parse()?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        modified_at: row.try_get("modified_at")?,
    })
}

pub(super) async fn create(pool: &PgPool, user: NewUser) -> StoreResult<Uuid> {
    require_key("user", "email", &user.email)?;

    let id = Uuid::now_v7();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, role, is_active, created_at, modified_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        "#,
    )
    .bind(id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .bind(user.is_active)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| conflict_on_unique(e, || format!("user with email {} already exists", user.email)))?;

    info!("Created user {}", id);
    Ok(id)
}

pub(super) async fn get_all(pool: &PgPool, pagination: Pagination) -> StoreResult<Vec<User>> {
    let options = pagination.find_options(SortKey::Email)?;

    let sql = format!(
        r#"SELECT {} FROM users ORDER BY {} COLLATE "C" ASC, id ASC LIMIT $1 OFFSET $2"#,
        USER_COLUMNS,
        options.sort_key.column()
    );
    let rows = sqlx::query(&sql)
        .bind(options.limit as i64)
        .bind(options.skip as i64)
        .fetch_all(pool)
        .await?;

    rows.iter().map(user_from_row).collect()
}

pub(super) async fn get_by_email(pool: &PgPool, email: &str) -> StoreResult<User> {
    let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("user", "email", email))?;

    user_from_row(&row)
}

pub(super) async fn get_by_id(pool: &PgPool, id: &str) -> StoreResult<User> {
    let user_id = parse_id("user", id)?;

    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("user", "id", id))?;

    user_from_row(&row)
}

pub(super) async fn update_by_id(pool: &PgPool, id: &str, patch: UserPatch) -> StoreResult<u64> {
    let user_id = parse_id("user", id)?;
    if let Some(email) = &patch.email {
        require_key("user", "email", email)?;
    }

    let result = sqlx::query(
        r#"
        UPDATE users SET
            email = COALESCE($2, email),
            password_hash = COALESCE($3, password_hash),
            role = COALESCE($4, role),
            is_active = COALESCE($5, is_active),
            modified_at = GREATEST(now(), modified_at + interval '1 microsecond')
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(patch.email.as_deref())
    .bind(patch.password_hash.as_deref())
    .bind(patch.role.map(|role| role.as_str()))
    .bind(patch.is_active)
    .execute(pool)
    .await
    .map_err(|e| conflict_on_unique(e, || "a user with this email already exists".to_string()))?;

    if result.rows_affected() == 0 {
        warn!("No user {} to update", user_id);
    }
    Ok(result.rows_affected())
}

pub(super) async fn delete_by_id(pool: &PgPool, id: &str) -> StoreResult<u64> {
    let user_id = parse_id("user", id)?;

    let mut tx = begin_serializable(pool).await?;
    check_all(&mut *tx, USER_REFERENCES, user_id).await?;

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    if result.rows_affected() > 0 {
        info!("Deleted user {}", user_id);
    }
    Ok(result.rows_affected())
}
