use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A user identity as the auth core sees it.
///
/// Reconstructable either from a storage row or from the claims embedded
/// in a bearer token (no storage round-trip on token validation).
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    // ---
    /// Stable numeric handle, the token subject.
    pub id: i64,
    pub username: String,
    /// Argon2 PHC-format hash. Snapshotted into issued tokens.
    pub password_hash: String,
    /// Opaque ceremony subject id, used as the WebAuthn user handle.
    pub webauthn_id: Uuid,
    pub profile_picture_id: Option<i64>,
}

/// A stored WebAuthn credential, owned by exactly one [`Identity`].
#[derive(Debug, Clone)]
pub struct StoredCredential {
    // ---
    /// Raw credential id from the authenticator, globally unique.
    pub id: Vec<u8>,

    /// Owning identity.
    pub identity_id: i64,

    /// Serialized passkey state for the ceremony library.
    pub public_key: Vec<u8>,

    /// Signature counter, monotonically non-decreasing across logins.
    pub sign_count: i64,

    /// Space-delimited transport hints; empty/absent means none advertised.
    pub transports: Option<String>,

    pub user_verified: bool,
    pub backup_eligible: bool,
    pub backup_state: bool,

    /// Attestation blobs captured at registration.
    pub attestation_object: Option<Vec<u8>>,
    pub attestation_client_data: Option<Vec<u8>>,

    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}
