//! Authentication service routes

use axum::{
    Json, Router,
    extract::{ConnectInfo, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::{TypedHeader, headers::UserAgent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use store::models::{NewSession, NewUser, Role, User};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    error::{AuthError, AuthResult},
    password::{hash_password, verify_password},
    state::AppState,
    validation::{validate_email, validate_password},
};

/// Credentials for registration and login
#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Response for user login
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub session_id: Uuid,
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
    pub user: User,
}

/// Request for access token renewal
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewRequest {
    pub session_id: String,
    pub refresh_token: String,
}

/// Response for access token renewal
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewResponse {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/heartbeat", get(heartbeat))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/renew", post(renew_access_token))
        .with_state(state)
}

/// Heartbeat endpoint
pub async fn heartbeat() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

/// User registration endpoint
///
/// New users are inactive until an administrator approves them.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> AuthResult<StatusCode> {
    validate_email(&payload.email).map_err(AuthError::BadRequest)?;
    validate_password(&payload.password).map_err(AuthError::BadRequest)?;

    let password_hash = hash_password(&payload.password)?;
    let user_id = state
        .store
        .create_user(NewUser {
            email: payload.email,
            password_hash,
            role: Role::User,
            is_active: false,
        })
        .await?;

    info!("Registered user {}", user_id);
    Ok(StatusCode::CREATED)
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    user_agent: Option<TypedHeader<UserAgent>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(payload): Json<Credentials>,
) -> AuthResult<impl IntoResponse> {
    let user = state.store.get_user_by_email(&payload.email).await?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!("Rejected login for user {}", user.id);
        return Err(AuthError::Unauthorized("invalid credentials".to_string()));
    }

    let (access_token, access_payload) = state
        .token_maker
        .create_token(&user.email, state.access_token_ttl)
        .map_err(|e| {
            error!("Failed to create access token: {}", e);
            AuthError::InternalServerError
        })?;

    let (refresh_token, refresh_payload) = state
        .token_maker
        .create_token(&user.email, state.refresh_token_ttl)
        .map_err(|e| {
            error!("Failed to create refresh token: {}", e);
            AuthError::InternalServerError
        })?;

    let session_id = state
        .store
        .create_session(NewSession {
            id: Some(refresh_payload.id),
            user_id: user.id,
            refresh_token: refresh_token.clone(),
            user_agent: user_agent
                .map(|TypedHeader(agent)| agent.as_str().to_string())
                .unwrap_or_default(),
            client_ip: connect_info
                .map(|ConnectInfo(addr)| addr.ip().to_string())
                .unwrap_or_default(),
            is_blocked: false,
            expires_at: refresh_payload.expires_at,
        })
        .await?;

    info!("User {} logged in with session {}", user.id, session_id);

    let response = LoginResponse {
        session_id,
        access_token,
        access_token_expires_at: access_payload.expires_at,
        refresh_token,
        refresh_token_expires_at: refresh_payload.expires_at,
        user,
    };

    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Access token renewal endpoint
pub async fn renew_access_token(
    State(state): State<AppState>,
    Json(payload): Json<RenewRequest>,
) -> AuthResult<Json<RenewResponse>> {
    let refresh_payload = state
        .token_maker
        .verify_token(&payload.refresh_token)
        .map_err(|e| AuthError::Unauthorized(e.to_string()))?;

    let session = state.store.get_session_by_id(&payload.session_id).await?;

    if session.is_blocked {
        warn!("Renewal attempted on blocked session {}", session.id);
        return Err(AuthError::Unauthorized("blocked session".to_string()));
    }

    let session_owner = session.user.as_ref().map(|user| user.email.as_str());
    if session_owner != Some(refresh_payload.subject.as_str()) {
        return Err(AuthError::Unauthorized("incorrect session user".to_string()));
    }

    if session.refresh_token != payload.refresh_token {
        return Err(AuthError::Unauthorized(
            "mismatched session token".to_string(),
        ));
    }

    if session.is_expired_at(Utc::now()) {
        return Err(AuthError::Unauthorized("expired session".to_string()));
    }

    let (access_token, access_payload) = state
        .token_maker
        .create_token(&refresh_payload.subject, state.access_token_ttl)
        .map_err(|e| {
            error!("Failed to create access token: {}", e);
            AuthError::InternalServerError
        })?;

    Ok(Json(RenewResponse {
        access_token,
        access_token_expires_at: access_payload.expires_at,
    }))
}
