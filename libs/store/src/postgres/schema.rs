//! One-time schema installation

use sqlx::PgPool;

use crate::error::StoreResult;

/// Advisory lock key serializing concurrent installs
const SCHEMA_LOCK_KEY: i64 = 0x7265_6369_7065_7331;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL,
        modified_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users (email)",
    r#"
    CREATE TABLE IF NOT EXISTS authors (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        first_name TEXT NOT NULL DEFAULT '',
        last_name TEXT NOT NULL DEFAULT '',
        website_url TEXT NOT NULL DEFAULT '',
        instagram_url TEXT NOT NULL DEFAULT '',
        youtube_url TEXT NOT NULL DEFAULT '',
        image_name TEXT NOT NULL DEFAULT '',
        user_id UUID NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        modified_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS authors_name_key ON authors (name)",
    "CREATE INDEX IF NOT EXISTS authors_user_id_idx ON authors (user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS recipes (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        image_name TEXT NOT NULL DEFAULT '',
        recipe_url TEXT NOT NULL DEFAULT '',
        time_m INTEGER NOT NULL DEFAULT 0,
        category TEXT NOT NULL,
        ingredients JSONB NOT NULL DEFAULT '[]',
        prep_steps JSONB NOT NULL DEFAULT '[]',
        author_id UUID NOT NULL,
        user_id UUID NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        modified_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS recipes_name_key ON recipes (name)",
    "CREATE INDEX IF NOT EXISTS recipes_author_id_idx ON recipes (author_id)",
    "CREATE INDEX IF NOT EXISTS recipes_user_id_idx ON recipes (user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL,
        refresh_token TEXT NOT NULL,
        user_agent TEXT NOT NULL DEFAULT '',
        client_ip TEXT NOT NULL DEFAULT '',
        is_blocked BOOLEAN NOT NULL DEFAULT FALSE,
        expires_at TIMESTAMPTZ NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
];

/// Create tables and uniqueness constraints if they do not exist yet
pub(super) async fn install(pool: &PgPool) -> StoreResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(())
}
