//! Passkey login ceremony handlers.
//!
//! Two-phase challenge/response flow keyed by username (the caller holds no
//! credential yet):
//! 1. `begin` - generate the assertion challenge and park the server state
//! 2. `finish` - pop the state, verify the assertion, mint a token

use crate::app_state::AppState;
use crate::auth::{session_cookie, CeremonyKey, CeremonyState};
use crate::error::ApiError;
use crate::handlers::auth::TokenResponse;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use webauthn_rs::prelude::PublicKeyCredential;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BeginPasskeyLoginRequest {
    // ---
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct BeginPasskeyLoginResponse {
    // ---
    /// Assertion options for `navigator.credentials.get()`, JSON-encoded as
    /// an opaque string.
    pub options_json: String,
}

#[derive(Debug, Deserialize)]
pub struct FinishPasskeyLoginRequest {
    // ---
    pub username: String,
    /// The authenticator's assertion response, in the WebAuthn JSON wire
    /// format.
    pub assertion: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/auth/passkey/login/begin
pub async fn begin(
    State(state): State<AppState>,
    Json(req): Json<BeginPasskeyLoginRequest>,
) -> Result<Json<BeginPasskeyLoginResponse>, ApiError> {
    // ---
    let identity = state
        .gateway()
        .by_name(&req.username)
        .await
        .map_err(|_| ApiError::unauthenticated("could not authenticate"))?;

    let passkeys = state.gateway().passkeys_for(&identity).await?;
    if passkeys.is_empty() {
        tracing::warn!("user '{}' has no registered passkeys", req.username);
        return Err(ApiError::unauthenticated("could not authenticate"));
    }

    let (options, ceremony) = state
        .webauthn()
        .start_passkey_authentication(&passkeys)
        .map_err(|e| {
            tracing::error!("failed to start passkey login: {e}");
            ApiError::invalid_argument("could not begin login ceremony")
        })?;

    let options_json = serde_json::to_string(&options).map_err(ApiError::internal)?;

    // Parked for the matching finish call; a repeated begin for the same
    // username overwrites (last begin wins).
    state.ceremonies().put(
        CeremonyKey::Login(req.username.clone()),
        CeremonyState::Login(ceremony),
    );

    tracing::info!("passkey login challenge issued for: {}", req.username);

    Ok(Json(BeginPasskeyLoginResponse { options_json }))
}

/// POST /api/v1/auth/passkey/login/finish
pub async fn finish(
    State(state): State<AppState>,
    Json(req): Json<FinishPasskeyLoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // ---
    let identity = state
        .gateway()
        .by_name(&req.username)
        .await
        .map_err(|_| ApiError::invalid_argument("unknown user"))?;

    // Consume-once: a second finish for the same begin always fails here.
    let ceremony = state
        .ceremonies()
        .take(&CeremonyKey::Login(req.username.clone()))
        .ok_or_else(|| ApiError::invalid_argument("ceremony session missing or expired"))?;

    let CeremonyState::Login(auth_state) = ceremony else {
        return Err(ApiError::invalid_argument("ceremony session mismatch"));
    };

    let credential: PublicKeyCredential = serde_json::from_str(&req.assertion)
        .map_err(|_| ApiError::invalid_argument("malformed assertion payload"))?;

    let auth_result = state
        .webauthn()
        .finish_passkey_authentication(&credential, &auth_state)
        .map_err(|e| {
            state.metrics().record_ceremony("login", false);
            tracing::warn!("passkey login failed for '{}': {e}", req.username);
            ApiError::unauthenticated("could not authenticate")
        })?;

    state
        .gateway()
        .touch_credential(&identity, &auth_result)
        .await?;

    let token = state
        .tokens()
        .issue(&identity, state.token_ttl())
        .map_err(ApiError::internal)?;

    state.metrics().record_ceremony("login", true);
    tracing::info!("passkey login for username: {}", identity.username);

    Ok((
        AppendHeaders([(SET_COOKIE, session_cookie(&token, state.token_ttl()))]),
        Json(TokenResponse { token }),
    ))
}
