use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::{info, warn};
use uuid::Uuid;

use super::{authors::profile_from_row, begin_serializable, user_snapshot};
use crate::{
    error::{StoreError, StoreResult, conflict_on_unique},
    models::{Ingredient, NewRecipe, PrepStep, Recipe, RecipePatch, parse_id, require_key},
    pagination::{Pagination, SortKey},
};

const SELECT_RECIPES: &str = r#"
    SELECT r.id, r.name, r.image_name, r.recipe_url, r.time_m, r.category,
           r.ingredients, r.prep_steps, r.created_at, r.modified_at,
           a.id AS a_id, a.name AS a_name, a.first_name AS a_first_name,
           a.last_name AS a_last_name, a.website_url AS a_website_url,
           a.instagram_url AS a_instagram_url, a.youtube_url AS a_youtube_url,
           a.image_name AS a_image_name,
           u.id AS owner_id, u.email AS owner_email
    FROM recipes r
    LEFT JOIN authors a ON a.id = r.author_id
    LEFT JOIN users u ON u.id = r.user_id
"#;

fn recipe_from_row(row: &PgRow) -> StoreResult<Recipe> {
    let category: String = row.try_get("category")?;
    let ingredients: Json<Vec<Ingredient>> = row.try_get("ingredients")?;
    let prep_steps: Json<Vec<PrepStep>> = row.try_get("prep_steps")?;

    let author_id: Option<Uuid> = row.try_get("a_id")?;
    let author = match author_id {
        Some(_) => Some(profile_from_row(row, "a_")?),
        None => None,
    };

    Ok(Recipe {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        image_name: row.try_get("image_name")?,
        recipe_url: row.try_get("recipe_url")?,
        time_m: row.try_get("time_m")?,
        category: category.parse()?,
        ingredients: ingredients.0,
        prep_steps: prep_steps.0,
        created_at: row.try_get("created_at")?,
        modified_at: row.try_get("modified_at")?,
        author,
        user_created: user_snapshot(row, "owner_id", "owner_email")?,
    })
}

pub(super) async fn create(pool: &PgPool, recipe: NewRecipe) -> StoreResult<Uuid> {
    require_key("recipe", "name", &recipe.name)?;

    let id = Uuid::now_v7();
    let now = Utc::now();
    let prep_steps = PrepStep::ranked(recipe.prep_steps);

    let mut tx = begin_serializable(pool).await?;
    sqlx::query(
        r#"
        INSERT INTO recipes (id, name, image_name, recipe_url, time_m, category, ingredients,
                             prep_steps, author_id, user_id, created_at, modified_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
        "#,
    )
    .bind(id)
    .bind(&recipe.name)
    .bind(&recipe.image_name)
    .bind(&recipe.recipe_url)
    .bind(recipe.time_m)
    .bind(recipe.category.as_str())
    .bind(Json(&recipe.ingredients))
    .bind(Json(&prep_steps))
    .bind(recipe.author_id)
    .bind(recipe.user_id)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| conflict_on_unique(e, || format!("recipe with name {} already exists", recipe.name)))?;
    tx.commit().await?;

    info!("Created recipe {}", id);
    Ok(id)
}

pub(super) async fn get_all(pool: &PgPool, pagination: Pagination) -> StoreResult<Vec<Recipe>> {
    let options = pagination.find_options(SortKey::Name)?;

    let sql = format!(
        r#"{} ORDER BY r.{} COLLATE "C" ASC, r.id ASC LIMIT $1 OFFSET $2"#,
        SELECT_RECIPES,
        options.sort_key.column()
    );
    let rows = sqlx::query(&sql)
        .bind(options.limit as i64)
        .bind(options.skip as i64)
        .fetch_all(pool)
        .await?;

    rows.iter().map(recipe_from_row).collect()
}

pub(super) async fn get_by_id(pool: &PgPool, id: &str) -> StoreResult<Recipe> {
    let recipe_id = parse_id("recipe", id)?;

    let sql = format!("{} WHERE r.id = $1", SELECT_RECIPES);
    let row = sqlx::query(&sql)
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("recipe", "id", id))?;

    recipe_from_row(&row)
}

pub(super) async fn update_by_id(pool: &PgPool, id: &str, patch: RecipePatch) -> StoreResult<u64> {
    let recipe_id = parse_id("recipe", id)?;
    if let Some(name) = &patch.name {
        require_key("recipe", "name", name)?;
    }

    let mut tx = begin_serializable(pool).await?;
    let result = sqlx::query(
        r#"
        UPDATE recipes SET
            name = COALESCE($2, name),
            image_name = COALESCE($3, image_name),
            recipe_url = COALESCE($4, recipe_url),
            time_m = COALESCE($5, time_m),
            category = COALESCE($6, category),
            ingredients = COALESCE($7, ingredients),
            prep_steps = COALESCE($8, prep_steps),
            author_id = COALESCE($9, author_id),
            modified_at = GREATEST(now(), modified_at + interval '1 microsecond')
        WHERE id = $1
        "#,
    )
    .bind(recipe_id)
    .bind(patch.name.as_deref())
    .bind(patch.image_name.as_deref())
    .bind(patch.recipe_url.as_deref())
    .bind(patch.time_m)
    .bind(patch.category.map(|category| category.as_str()))
    .bind(patch.ingredients.map(Json))
    .bind(patch.prep_steps.map(Json))
    .bind(patch.author_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| conflict_on_unique(e, || "a recipe with this name already exists".to_string()))?;
    tx.commit().await?;

    if result.rows_affected() == 0 {
        warn!("No recipe {} to update", recipe_id);
    }
    Ok(result.rows_affected())
}

pub(super) async fn delete_by_id(pool: &PgPool, id: &str) -> StoreResult<u64> {
    let recipe_id = parse_id("recipe", id)?;

    let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        info!("Deleted recipe {}", recipe_id);
    }
    Ok(result.rows_affected())
}
