//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use store::{
    Pagination,
    models::{
        Author, AuthorPatch, NewAuthor, NewRecipe, NewUser, Recipe, RecipePatch, Role, User,
        UserPatch,
    },
};
use token::Payload;
use tracing::{error, info};

use auth::{
    password::hash_password,
    validation::{validate_email, validate_password},
};

use crate::{
    error::{ApiError, ApiResult},
    middleware::auth_middleware,
    state::AppState,
};

/// Request for creating a user
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_active: bool,
}

/// Request for patching a user; absent fields stay unchanged
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserPatchRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).patch(patch_user).delete(delete_user),
        )
        .route("/authors", get(list_authors).post(create_author))
        .route(
            "/authors/:id",
            get(get_author).patch(patch_author).delete(delete_author),
        )
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe).patch(patch_recipe).delete(delete_recipe),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/heartbeat", get(heartbeat))
        .merge(protected_routes)
        .with_state(state)
}

/// Heartbeat endpoint
pub async fn heartbeat() -> impl IntoResponse {
    Json(json!({
        "status": "ok"
    }))
}

fn created(id: uuid::Uuid) -> impl IntoResponse {
    (StatusCode::CREATED, Json(json!({ "id": id })))
}

fn require_found(entity: &str, id: &str, count: u64) -> ApiResult<()> {
    if count == 0 {
        return Err(ApiError::NotFound(format!(
            "could not find {} with id {}",
            entity, id
        )));
    }
    Ok(())
}

fn hash(password: &str) -> ApiResult<String> {
    hash_password(password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        ApiError::InternalServerError
    })
}

// Users

pub async fn list_users(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.store.get_all_users(pagination).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Payload>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_email(&payload.email).map_err(ApiError::BadRequest)?;
    validate_password(&payload.password).map_err(ApiError::BadRequest)?;

    let id = state
        .store
        .create_user(NewUser {
            email: payload.email,
            password_hash: hash(&payload.password)?,
            role: payload.role,
            is_active: payload.is_active,
        })
        .await?;

    info!("{} created user {}", caller.subject, id);
    Ok(created(id))
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<User>> {
    Ok(Json(state.store.get_user_by_id(&id).await?))
}

pub async fn patch_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Payload>,
    Path(id): Path<String>,
    Json(payload): Json<UserPatchRequest>,
) -> ApiResult<StatusCode> {
    if let Some(email) = &payload.email {
        validate_email(email).map_err(ApiError::BadRequest)?;
    }
    let password_hash = match &payload.password {
        Some(password) => {
            validate_password(password).map_err(ApiError::BadRequest)?;
            Some(hash(password)?)
        }
        None => None,
    };

    let patch = UserPatch {
        email: payload.email,
        password_hash,
        role: payload.role,
        is_active: payload.is_active,
    };
    if patch.is_empty() {
        return Err(ApiError::BadRequest("missing user patch".to_string()));
    }

    let modified = state.store.update_user_by_id(&id, patch).await?;
    require_found("user", &id, modified)?;

    info!("{} updated user {}", caller.subject, id);
    Ok(StatusCode::OK)
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Payload>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let deleted = state.store.delete_user_by_id(&id).await?;
    require_found("user", &id, deleted)?;

    info!("{} deleted user {}", caller.subject, id);
    Ok(StatusCode::OK)
}

// Authors

pub async fn list_authors(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<Author>>> {
    Ok(Json(state.store.get_all_authors(pagination).await?))
}

pub async fn create_author(
    State(state): State<AppState>,
    Extension(caller): Extension<Payload>,
    Json(payload): Json<NewAuthor>,
) -> ApiResult<impl IntoResponse> {
    let id = state.store.create_author(payload).await?;

    info!("{} created author {}", caller.subject, id);
    Ok(created(id))
}

pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Author>> {
    Ok(Json(state.store.get_author_by_id(&id).await?))
}

pub async fn patch_author(
    State(state): State<AppState>,
    Extension(caller): Extension<Payload>,
    Path(id): Path<String>,
    Json(patch): Json<AuthorPatch>,
) -> ApiResult<StatusCode> {
    if patch.is_empty() {
        return Err(ApiError::BadRequest("missing author patch".to_string()));
    }

    let modified = state.store.update_author_by_id(&id, patch).await?;
    require_found("author", &id, modified)?;

    info!("{} updated author {}", caller.subject, id);
    Ok(StatusCode::OK)
}

pub async fn delete_author(
    State(state): State<AppState>,
    Extension(caller): Extension<Payload>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let deleted = state.store.delete_author_by_id(&id).await?;
    require_found("author", &id, deleted)?;

    info!("{} deleted author {}", caller.subject, id);
    Ok(StatusCode::OK)
}

// Recipes

pub async fn list_recipes(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<Recipe>>> {
    Ok(Json(state.store.get_all_recipes(pagination).await?))
}

pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<Payload>,
    Json(payload): Json<NewRecipe>,
) -> ApiResult<impl IntoResponse> {
    let id = state.store.create_recipe(payload).await?;

    info!("{} created recipe {}", caller.subject, id);
    Ok(created(id))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Recipe>> {
    Ok(Json(state.store.get_recipe_by_id(&id).await?))
}

/// Patch a recipe, removing its previous image if the patch replaces it
pub async fn patch_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<Payload>,
    Path(id): Path<String>,
    Json(patch): Json<RecipePatch>,
) -> ApiResult<StatusCode> {
    if patch.is_empty() {
        return Err(ApiError::BadRequest("missing recipe patch".to_string()));
    }

    let existing = state.store.get_recipe_by_id(&id).await?;
    let replaced_image = patch
        .image_name
        .as_ref()
        .is_some_and(|image_name| *image_name != existing.image_name);

    let modified = state.store.update_recipe_by_id(&id, patch).await?;
    require_found("recipe", &id, modified)?;

    if replaced_image {
        state.images.remove_best_effort(&existing.image_name).await;
    }

    info!("{} updated recipe {}", caller.subject, id);
    Ok(StatusCode::OK)
}

/// Delete a recipe and, best-effort, its image
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<Payload>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let existing = state.store.get_recipe_by_id(&id).await?;

    let deleted = state.store.delete_recipe_by_id(&id).await?;
    require_found("recipe", &id, deleted)?;

    state.images.remove_best_effort(&existing.image_name).await;

    info!("{} deleted recipe {}", caller.subject, id);
    Ok(StatusCode::OK)
}
