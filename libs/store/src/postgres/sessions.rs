use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::user_snapshot;
use crate::{
    error::{StoreError, StoreResult, conflict_on_unique},
    models::{NewSession, Session, parse_id},
};

fn session_from_row(row: &PgRow) -> StoreResult<Session> {
    Ok(Session {
        id: row.try_get("id")?,
        refresh_token: row.try_get("refresh_token")?,
        user_agent: row.try_get("user_agent")?,
        client_ip: row.try_get("client_ip")?,
        is_blocked: row.try_get("is_blocked")?,
        expires_at: row.try_get("expires_at")?,
        created_at: row.try_get("created_at")?,
        user: user_snapshot(row, "owner_id", "owner_email")?,
    })
}

pub(super) async fn create(pool: &PgPool, session: NewSession) -> StoreResult<Uuid> {
    let id = session.id.unwrap_or_else(Uuid::now_v7);

    sqlx::query(
        r#"
        INSERT INTO sessions (id, user_id, refresh_token, user_agent, client_ip, is_blocked,
                              expires_at, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(id)
    .bind(session.user_id)
    .bind(&session.refresh_token)
    .bind(&session.user_agent)
    .bind(&session.client_ip)
    .bind(session.is_blocked)
    .bind(session.expires_at)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(|e| conflict_on_unique(e, || format!("session {} already exists", id)))?;

    info!("Created session {} for user {}", id, session.user_id);
    Ok(id)
}

pub(super) async fn get_by_id(pool: &PgPool, id: &str) -> StoreResult<Session> {
    let session_id = parse_id("session", id)?;

    let row = sqlx::query(
        r#"
        SELECT s.id, s.refresh_token, s.user_agent, s.client_ip, s.is_blocked,
               s.expires_at, s.created_at, u.id AS owner_id, u.email AS owner_email
        FROM sessions s
        LEFT JOIN users u ON u.id = s.user_id
        WHERE s.id = $1
        "#,
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::not_found("session", "id", id))?;

    session_from_row(&row)
}
