//! Adapter between stored identity/credential records and the shapes the
//! ceremony protocol needs.
//!
//! Stored credentials carry the ceremony library's serialized passkey state
//! as their public-key blob, alongside flat metadata columns (transports,
//! flags, attestation blobs) that the protocol produced at registration.

use crate::auth::password;
use crate::domain::{Identity, IdentityStorePtr, StoredCredential};
use crate::error::ApiError;
use chrono::Utc;
use uuid::Uuid;
use webauthn_rs::prelude::{AuthenticationResult, Passkey, RegisterPublicKeyCredential};
use webauthn_rs_proto::AuthenticatorTransport;

/// Thin adapter over the storage collaborator.
///
/// All failures surface as coded [`ApiError`]s: absent records are NotFound,
/// storage faults are Internal.
pub struct IdentityGateway {
    // ---
    store: IdentityStorePtr,
}

impl IdentityGateway {
    // ---
    pub fn new(store: IdentityStorePtr) -> Self {
        // ---
        Self { store }
    }

    pub fn store(&self) -> &IdentityStorePtr {
        // ---
        &self.store
    }

    pub async fn by_id(&self, id: i64) -> Result<Identity, ApiError> {
        // ---
        self.store
            .identity_by_id(id)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::not_found("identity not found"))
    }

    pub async fn by_name(&self, username: &str) -> Result<Identity, ApiError> {
        // ---
        self.try_by_name(username)
            .await?
            .ok_or_else(|| ApiError::not_found("identity not found"))
    }

    /// Lookup that distinguishes "absent" from "storage failed", for
    /// callers with their own policy on missing identities (signup, login).
    pub async fn try_by_name(&self, username: &str) -> Result<Option<Identity>, ApiError> {
        // ---
        self.store
            .identity_by_name(username)
            .await
            .map_err(ApiError::internal)
    }

    /// Create an identity: hashes the password and mints a fresh ceremony
    /// subject id. Duplicate-username policy belongs to the caller.
    pub async fn create_identity(
        &self,
        username: &str,
        raw_password: &str,
    ) -> Result<Identity, ApiError> {
        // ---
        let hash = password::hash(raw_password).map_err(ApiError::internal)?;
        self.store
            .create_identity(username, &hash, Uuid::new_v4())
            .await
            .map_err(ApiError::internal)
    }

    pub async fn update_password(&self, id: i64, new_password: &str) -> Result<(), ApiError> {
        // ---
        let hash = password::hash(new_password).map_err(ApiError::internal)?;
        self.store
            .update_password(id, &hash)
            .await
            .map_err(ApiError::internal)
    }

    /// Raw stored credentials for an identity, for credential management.
    pub async fn credentials_for(
        &self,
        identity: &Identity,
    ) -> Result<Vec<StoredCredential>, ApiError> {
        // ---
        self.store
            .credentials_for(identity.id)
            .await
            .map_err(ApiError::internal)
    }

    /// An identity's credentials in the ceremony library's shape.
    ///
    /// Rows whose passkey state no longer deserializes are skipped with an
    /// error log rather than failing the whole ceremony.
    pub async fn passkeys_for(&self, identity: &Identity) -> Result<Vec<Passkey>, ApiError> {
        // ---
        let credentials = self.credentials_for(identity).await?;

        Ok(credentials
            .iter()
            .filter_map(|cred| {
                serde_json::from_slice(&cred.public_key)
                    .map_err(|e| {
                        tracing::error!(
                            "failed to deserialize passkey for credential {}: {e}",
                            hex::encode(&cred.id),
                        );
                    })
                    .ok()
            })
            .collect())
    }

    /// Persist a credential created by a completed registration ceremony.
    pub async fn record_credential(
        &self,
        identity: &Identity,
        passkey: &Passkey,
        response: &RegisterPublicKeyCredential,
    ) -> Result<StoredCredential, ApiError> {
        // ---
        let now = Utc::now();
        let credential = StoredCredential {
            id: passkey.cred_id().as_ref().to_vec(),
            identity_id: identity.id,
            public_key: serde_json::to_vec(passkey).map_err(ApiError::internal)?,
            sign_count: 0,
            transports: format_transports(response.response.transports.as_deref()),
            // The attestation response does not carry these flags; they are
            // refreshed on every successful login.
            user_verified: false,
            backup_eligible: false,
            backup_state: false,
            attestation_object: Some(response.response.attestation_object.as_ref().to_vec()),
            attestation_client_data: Some(response.response.client_data_json.as_ref().to_vec()),
            created_at: now,
            last_used: now,
        };

        self.store
            .insert_credential(credential.clone())
            .await
            .map_err(ApiError::internal)?;

        Ok(credential)
    }

    /// After a successful login ceremony: advance the stored sign counter,
    /// refresh the flags and last-used timestamp, and persist the ceremony
    /// library's updated passkey state.
    pub async fn touch_credential(
        &self,
        identity: &Identity,
        auth: &AuthenticationResult,
    ) -> Result<(), ApiError> {
        // ---
        let cred_id: &[u8] = auth.cred_id().as_ref();
        let mut stored = self
            .store
            .credential_by_id(cred_id, identity.id)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| {
                // Verified by the library but unknown to storage.
                ApiError::internal(format!(
                    "verified credential {} not found for identity {}",
                    hex::encode(cred_id),
                    identity.id
                ))
            })?;

        if auth.needs_update() {
            if let Ok(mut passkey) = serde_json::from_slice::<Passkey>(&stored.public_key) {
                passkey.update_credential(auth);
                stored.public_key = serde_json::to_vec(&passkey).map_err(ApiError::internal)?;
            }
        }

        stored.sign_count = i64::from(auth.counter());
        stored.user_verified = auth.user_verified();
        stored.backup_eligible = auth.backup_eligible();
        stored.backup_state = auth.backup_state();
        stored.last_used = Utc::now();

        self.store
            .update_credential(stored)
            .await
            .map_err(ApiError::internal)
    }

    /// Remove a credential. NotFound when the identity owns no such one.
    pub async fn delete_credential(
        &self,
        identity: &Identity,
        credential_id: &[u8],
    ) -> Result<(), ApiError> {
        // ---
        let deleted = self
            .store
            .delete_credential(credential_id, identity.id)
            .await
            .map_err(ApiError::internal)?;

        if deleted {
            Ok(())
        } else {
            Err(ApiError::not_found("credential not found"))
        }
    }
}

/// Parse the stored space-delimited transport field. Empty or absent means
/// no advertised transports.
pub fn parse_transports(raw: Option<&str>) -> Vec<String> {
    // ---
    raw.map(|s| s.split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default()
}

fn format_transports(transports: Option<&[AuthenticatorTransport]>) -> Option<String> {
    // ---
    let transports = transports?;
    if transports.is_empty() {
        return None;
    }

    // AuthenticatorTransport serializes as a bare lowercase string.
    let joined = transports
        .iter()
        .filter_map(|t| match serde_json::to_value(t) {
            Ok(serde_json::Value::String(s)) => Some(s),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ");

    Some(joined)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn transports_parse_round_trip() {
        // ---
        assert_eq!(parse_transports(None), Vec::<String>::new());
        assert_eq!(parse_transports(Some("")), Vec::<String>::new());
        assert_eq!(
            parse_transports(Some("usb internal")),
            vec!["usb".to_string(), "internal".to_string()]
        );
    }

    #[test]
    fn format_skips_empty() {
        // ---
        assert_eq!(format_transports(None), None);
        assert_eq!(format_transports(Some(&[])), None);
        assert_eq!(
            format_transports(Some(&[AuthenticatorTransport::Usb])),
            Some("usb".to_string())
        );
    }
}
