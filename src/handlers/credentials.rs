//! Stored-credential management for the authenticated caller.

use crate::app_state::AppState;
use crate::auth::parse_transports;
use crate::error::ApiError;
use crate::surface::Caller;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CredentialSummary {
    // ---
    /// Hex-encoded raw credential id.
    pub id: String,
    pub sign_count: i64,
    pub transports: Vec<String>,
    pub user_verified: bool,
    pub backup_eligible: bool,
    pub backup_state: bool,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ListCredentialsResponse {
    // ---
    pub credentials: Vec<CredentialSummary>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/user/credentials
pub async fn list_credentials(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<ListCredentialsResponse>, ApiError> {
    // ---
    let identity = state.gateway().by_id(caller.id).await?;
    let stored = state.gateway().credentials_for(&identity).await?;

    let credentials = stored
        .into_iter()
        .map(|cred| CredentialSummary {
            id: hex::encode(&cred.id),
            sign_count: cred.sign_count,
            transports: parse_transports(cred.transports.as_deref()),
            user_verified: cred.user_verified,
            backup_eligible: cred.backup_eligible,
            backup_state: cred.backup_state,
            created_at: cred.created_at,
            last_used: cred.last_used,
        })
        .collect();

    Ok(Json(ListCredentialsResponse { credentials }))
}

/// DELETE /api/v1/user/credentials/{id}
///
/// The id is the hex encoding returned by the list endpoint. Deleting a
/// credential the caller does not own is NotFound, not PermissionDenied;
/// ownership scoping happens in the storage query.
pub async fn delete_credential(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    // ---
    let credential_id =
        hex::decode(&id).map_err(|_| ApiError::invalid_argument("malformed credential id"))?;

    let identity = state.gateway().by_id(caller.id).await?;
    state
        .gateway()
        .delete_credential(&identity, &credential_id)
        .await?;

    tracing::info!(
        "deleted credential {} for username: {}",
        id,
        identity.username
    );

    Ok(StatusCode::NO_CONTENT)
}
