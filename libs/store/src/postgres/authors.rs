use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{info, warn};
use uuid::Uuid;

use super::{begin_serializable, user_snapshot};
use crate::{
    error::{StoreError, StoreResult, conflict_on_unique},
    integrity::{AUTHOR_REFERENCES, check_all},
    models::{Author, AuthorPatch, AuthorProfile, NewAuthor, parse_id, require_key},
    pagination::{Pagination, SortKey},
};

const SELECT_AUTHORS: &str = r#"
    SELECT a.id, a.name, a.first_name, a.last_name, a.website_url, a.instagram_url,
           a.youtube_url, a.image_name, a.created_at, a.modified_at,
           u.id AS owner_id, u.email AS owner_email
    FROM authors a
    LEFT JOIN users u ON u.id = a.user_id
"#;

/// Read an author profile whose columns carry `prefix`
pub(super) fn profile_from_row(row: &PgRow, prefix: &str) -> StoreResult<AuthorProfile> {
    let column = |name: &str| format!("{}{}", prefix, name);

    Ok(AuthorProfile {
        id: row.try_get(column("id").as_str())?,
        name: row.try_get(column("name").as_str())?,
        first_name: row.try_get(column("first_name").as_str())?,
        last_name: row.try_get(column("last_name").as_str())?,
        website_url: row.try_get(column("website_url").as_str())?,
        instagram_url: row.try_get(column("instagram_url").as_str())?,
        youtube_url: row.try_get(column("youtube_url").as_str())?,
        image_name: row.try_get(column("image_name").as_str())?,
    })
}

fn author_from_row(row: &PgRow) -> StoreResult<Author> {
    Ok(Author {
        profile: profile_from_row(row, "")?,
        created_at: row.try_get("created_at")?,
        modified_at: row.try_get("modified_at")?,
        user_created: user_snapshot(row, "owner_id", "owner_email")?,
    })
}

pub(super) async fn create(pool: &PgPool, author: NewAuthor) -> StoreResult<Uuid> {
    require_key("author", "name", &author.name)?;

    let id = Uuid::now_v7();
    let now = Utc::now();

    let mut tx = begin_serializable(pool).await?;
    sqlx::query(
        r#"
        INSERT INTO authors (id, name, first_name, last_name, website_url, instagram_url,
                             youtube_url, image_name, user_id, created_at, modified_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        "#,
    )
    .bind(id)
    .bind(&author.name)
    .bind(&author.first_name)
    .bind(&author.last_name)
    .bind(&author.website_url)
    .bind(&author.instagram_url)
    .bind(&author.youtube_url)
    .bind(&author.image_name)
    .bind(author.user_id)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| conflict_on_unique(e, || format!("author with name {} already exists", author.name)))?;
    tx.commit().await?;

    info!("Created author {}", id);
    Ok(id)
}

pub(super) async fn get_all(pool: &PgPool, pagination: Pagination) -> StoreResult<Vec<Author>> {
    let options = pagination.find_options(SortKey::Name)?;

    let sql = format!(
        r#"{} ORDER BY a.{} COLLATE "C" ASC, a.id ASC LIMIT $1 OFFSET $2"#,
        SELECT_AUTHORS,
        options.sort_key.column()
    );
    let rows = sqlx::query(&sql)
        .bind(options.limit as i64)
        .bind(options.skip as i64)
        .fetch_all(pool)
        .await?;

    rows.iter().map(author_from_row).collect()
}

pub(super) async fn get_by_id(pool: &PgPool, id: &str) -> StoreResult<Author> {
    let author_id = parse_id("author", id)?;

    let sql = format!("{} WHERE a.id = $1", SELECT_AUTHORS);
    let row = sqlx::query(&sql)
        .bind(author_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("author", "id", id))?;

    author_from_row(&row)
}

pub(super) async fn update_by_id(pool: &PgPool, id: &str, patch: AuthorPatch) -> StoreResult<u64> {
    let author_id = parse_id("author", id)?;
    if let Some(name) = &patch.name {
        require_key("author", "name", name)?;
    }

    let result = sqlx::query(
        r#"
        UPDATE authors SET
            name = COALESCE($2, name),
            first_name = COALESCE($3, first_name),
            last_name = COALESCE($4, last_name),
            website_url = COALESCE($5, website_url),
            instagram_url = COALESCE($6, instagram_url),
            youtube_url = COALESCE($7, youtube_url),
            image_name = COALESCE($8, image_name),
            modified_at = GREATEST(now(), modified_at + interval '1 microsecond')
        WHERE id = $1
        "#,
    )
    .bind(author_id)
    .bind(patch.name.as_deref())
    .bind(patch.first_name.as_deref())
    .bind(patch.last_name.as_deref())
    .bind(patch.website_url.as_deref())
    .bind(patch.instagram_url.as_deref())
    .bind(patch.youtube_url.as_deref())
    .bind(patch.image_name.as_deref())
    .execute(pool)
    .await
    .map_err(|e| conflict_on_unique(e, || "an author with this name already exists".to_string()))?;

    if result.rows_affected() == 0 {
        warn!("No author {} to update", author_id);
    }
    Ok(result.rows_affected())
}

pub(super) async fn delete_by_id(pool: &PgPool, id: &str) -> StoreResult<u64> {
    let author_id = parse_id("author", id)?;

    let mut tx = begin_serializable(pool).await?;
    check_all(&mut *tx, AUTHOR_REFERENCES, author_id).await?;

    let result = sqlx::query("DELETE FROM authors WHERE id = $1")
        .bind(author_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    if result.rows_affected() > 0 {
        info!("Deleted author {}", author_id);
    }
    Ok(result.rows_affected())
}
