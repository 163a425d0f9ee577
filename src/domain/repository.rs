use super::models::{Identity, StoredCredential};
use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

/// Abstraction for the identity/credential storage collaborator.
///
/// This is the entire boundary the auth core needs from persistent storage:
/// identity lookup, credential records, and sign-counter persistence.
#[async_trait::async_trait]
pub trait IdentityStore: Send + Sync {
    // ---
    /// Create a new identity with an already-hashed password.
    async fn create_identity(
        &self,
        username: &str,
        password_hash: &str,
        webauthn_id: Uuid,
    ) -> Result<Identity>;

    /// Get an identity by username.
    async fn identity_by_name(&self, username: &str) -> Result<Option<Identity>>;

    /// Get an identity by id.
    async fn identity_by_id(&self, id: i64) -> Result<Option<Identity>>;

    /// Replace an identity's password hash.
    async fn update_password(&self, id: i64, password_hash: &str) -> Result<()>;

    /// All credentials owned by an identity.
    async fn credentials_for(&self, identity_id: i64) -> Result<Vec<StoredCredential>>;

    /// A specific credential by raw id, scoped to its owning identity.
    async fn credential_by_id(
        &self,
        credential_id: &[u8],
        identity_id: i64,
    ) -> Result<Option<StoredCredential>>;

    /// Persist a newly registered credential.
    async fn insert_credential(&self, credential: StoredCredential) -> Result<()>;

    /// Update an existing credential (sign counter, last-used, passkey state).
    async fn update_credential(&self, credential: StoredCredential) -> Result<()>;

    /// Delete a credential. Returns false when nothing matched.
    async fn delete_credential(&self, credential_id: &[u8], identity_id: i64) -> Result<bool>;

    /// Storage liveness probe for the full health check.
    async fn ping(&self) -> Result<()>;
}

/// Type alias for any backend that implements IdentityStore.
pub type IdentityStorePtr = Arc<dyn IdentityStore>;
