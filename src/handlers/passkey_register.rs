//! Passkey registration ceremony handlers.
//!
//! Registration is only offered to an already-authenticated caller, so the
//! ceremony is keyed by identity id rather than username. Credentials the
//! identity already owns are excluded from the challenge.

use crate::app_state::AppState;
use crate::auth::{CeremonyKey, CeremonyState};
use crate::error::ApiError;
use crate::surface::Caller;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use webauthn_rs::prelude::{CredentialID, RegisterPublicKeyCredential};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BeginPasskeyRegistrationResponse {
    // ---
    /// Creation options for `navigator.credentials.create()`, JSON-encoded
    /// as an opaque string.
    pub options_json: String,
}

#[derive(Debug, Deserialize)]
pub struct FinishPasskeyRegistrationRequest {
    // ---
    /// The authenticator's attestation response, in the WebAuthn JSON wire
    /// format.
    pub attestation: String,
}

#[derive(Debug, Serialize)]
pub struct FinishPasskeyRegistrationResponse {
    // ---
    pub credential_id: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/auth/passkey/register/begin
pub async fn begin(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<BeginPasskeyRegistrationResponse>, ApiError> {
    // ---
    // Re-resolve from storage; the token carries a snapshot.
    let identity = state.gateway().by_id(caller.id).await?;

    let exclude: Vec<CredentialID> = state
        .gateway()
        .credentials_for(&identity)
        .await?
        .into_iter()
        .map(|cred| CredentialID::from(cred.id))
        .collect();
    let exclude = if exclude.is_empty() {
        None
    } else {
        Some(exclude)
    };

    let (options, ceremony) = state
        .webauthn()
        .start_passkey_registration(
            identity.webauthn_id,
            &identity.username,
            &identity.username,
            exclude,
        )
        .map_err(|e| {
            tracing::error!("failed to start passkey registration: {e}");
            ApiError::invalid_argument("could not begin registration ceremony")
        })?;

    let options_json = serde_json::to_string(&options).map_err(ApiError::internal)?;

    state.ceremonies().put(
        CeremonyKey::Registration(identity.id),
        CeremonyState::Registration(ceremony),
    );

    tracing::info!(
        "passkey registration challenge issued for: {}",
        identity.username
    );

    Ok(Json(BeginPasskeyRegistrationResponse { options_json }))
}

/// POST /api/v1/auth/passkey/register/finish
pub async fn finish(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<FinishPasskeyRegistrationRequest>,
) -> Result<Json<FinishPasskeyRegistrationResponse>, ApiError> {
    // ---
    let identity = state.gateway().by_id(caller.id).await?;

    let ceremony = state
        .ceremonies()
        .take(&CeremonyKey::Registration(identity.id))
        .ok_or_else(|| ApiError::invalid_argument("ceremony session missing or expired"))?;

    let CeremonyState::Registration(reg_state) = ceremony else {
        return Err(ApiError::invalid_argument("ceremony session mismatch"));
    };

    let credential: RegisterPublicKeyCredential = serde_json::from_str(&req.attestation)
        .map_err(|_| ApiError::invalid_argument("malformed attestation payload"))?;

    let passkey = state
        .webauthn()
        .finish_passkey_registration(&credential, &reg_state)
        .map_err(|e| {
            state.metrics().record_ceremony("registration", false);
            tracing::error!(
                "passkey registration failed for '{}': {e}",
                identity.username
            );
            ApiError::internal(e)
        })?;

    let stored = state
        .gateway()
        .record_credential(&identity, &passkey, &credential)
        .await?;

    state.metrics().record_ceremony("registration", true);
    tracing::info!(
        "registered passkey {} for username: {}",
        hex::encode(&stored.id),
        identity.username
    );

    Ok(Json(FinishPasskeyRegistrationResponse {
        credential_id: hex::encode(&stored.id),
    }))
}
