//! Authenticated identity management: current-user lookup, password change,
//! API-key issuance.

use crate::app_state::AppState;
use crate::auth;
use crate::error::ApiError;
use crate::surface::Caller;
use axum::http::StatusCode;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UserResponse {
    // ---
    pub id: i64,
    pub username: String,
    pub profile_picture_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    // ---
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiKeyRequest {
    // ---
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    // ---
    pub key: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/user
pub async fn get_user(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<UserResponse>, ApiError> {
    // ---
    let identity = state.gateway().by_id(caller.id).await?;

    Ok(Json(UserResponse {
        id: identity.id,
        username: identity.username,
        profile_picture_id: identity.profile_picture_id,
    }))
}

/// PUT /api/v1/user/password
///
/// Requires the current password. Outstanding tokens keep their embedded
/// hash snapshot and stay valid until expiry.
pub async fn update_password(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    // ---
    let identity = state.gateway().by_id(caller.id).await?;

    if !auth::verify_password(&req.old_password, &identity.password_hash) {
        return Err(ApiError::permission_denied("invalid password"));
    }
    if req.new_password != req.confirm_password {
        return Err(ApiError::invalid_argument("passwords do not match"));
    }

    state
        .gateway()
        .update_password(identity.id, &req.new_password)
        .await?;

    tracing::info!("password updated for username: {}", identity.username);

    Ok(StatusCode::OK)
}

/// POST /api/v1/user/api-key
///
/// Mints a long-lived bearer token for non-browser clients, after a fresh
/// password confirmation.
pub async fn api_key(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<ApiKeyRequest>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    // ---
    let identity = state.gateway().by_id(caller.id).await?;

    if !auth::verify_password(&req.password, &identity.password_hash) {
        return Err(ApiError::permission_denied("invalid username or password"));
    }
    if req.password != req.confirm_password {
        return Err(ApiError::invalid_argument("passwords do not match"));
    }

    let key = state
        .tokens()
        .issue(&identity, state.api_key_ttl())
        .map_err(ApiError::internal)?;

    tracing::info!("api key issued for username: {}", identity.username);

    Ok(Json(ApiKeyResponse { key }))
}
