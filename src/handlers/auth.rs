//! Password authentication handlers: signup, login, logout.
//!
//! These are the unauthenticated, rate-limited entry points. Login mints a
//! bearer token returned both in the response body and as a `Set-Cookie`
//! header, so browser and API clients get the same credential.

use crate::app_state::AppState;
use crate::auth::{self, clear_session_cookie, session_cookie};
use crate::error::ApiError;
use axum::http::{header::SET_COOKIE, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    // ---
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    // ---
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    // ---
    pub token: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/auth/signup
///
/// Creates an identity. Fails with AlreadyExists for a duplicate username
/// and InvalidArgument when the confirmation password does not match.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<StatusCode, ApiError> {
    // ---
    if state.gateway().try_by_name(&req.username).await?.is_some() {
        return Err(ApiError::already_exists("user already exists"));
    }

    if req.password != req.confirm_password {
        return Err(ApiError::invalid_argument("passwords do not match"));
    }

    state
        .gateway()
        .create_identity(&req.username, &req.password)
        .await?;

    state.metrics().record_signup();
    tracing::info!("created identity for username: {}", req.username);

    Ok(StatusCode::CREATED)
}

/// POST /api/v1/auth/login
///
/// Password login. Unknown usernames and wrong passwords both surface as
/// PermissionDenied with an identical message.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // ---
    let identity = state
        .gateway()
        .try_by_name(&req.username)
        .await?
        .ok_or_else(|| ApiError::permission_denied("invalid username or password"))?;

    if !auth::verify_password(&req.password, &identity.password_hash) {
        state.metrics().record_login(false);
        return Err(ApiError::permission_denied("invalid username or password"));
    }

    let token = state
        .tokens()
        .issue(&identity, state.token_ttl())
        .map_err(ApiError::internal)?;

    state.metrics().record_login(true);
    tracing::info!("password login for username: {}", identity.username);

    Ok((
        AppendHeaders([(SET_COOKIE, session_cookie(&token, state.token_ttl()))]),
        Json(TokenResponse { token }),
    ))
}

/// POST /api/v1/auth/logout
///
/// Stateless tokens cannot be revoked server-side; logout just clears the
/// browser cookie.
pub async fn logout() -> impl IntoResponse {
    // ---
    (
        AppendHeaders([(SET_COOKIE, clear_session_cookie())]),
        StatusCode::OK,
    )
}
