//! Stateless bearer tokens.
//!
//! Tokens are self-contained HS256 JWTs carrying a snapshot of the identity,
//! so validation never touches storage. The flip side is that a token stays
//! valid until its embedded expiry even if the password changes after
//! issuance; the embedded hash is a snapshot, never re-checked.

use crate::domain::Identity;
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// How token validation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    // ---
    /// Not a parseable token at all.
    Malformed,
    /// Bad signature, or a signing algorithm outside the HMAC family.
    SignatureInvalid,
    /// Past its embedded expiry.
    Expired,
    /// Not yet within its validity window.
    NotYetValid,
    /// Structurally valid but with unusable claims (e.g. non-numeric subject).
    ClaimsInvalid,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenError::Malformed => "token is malformed",
            TokenError::SignatureInvalid => "token signature is invalid",
            TokenError::Expired => "token is expired",
            TokenError::NotYetValid => "token is not valid yet",
            TokenError::ClaimsInvalid => "token claims are invalid",
        };
        f.write_str(s)
    }
}

impl std::error::Error for TokenError {}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        // ---
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::SignatureInvalid
            }
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            _ => TokenError::Malformed,
        }
    }
}

/// Claim set embedded in every issued token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    // ---
    iss: String,
    /// Identity id, stringified.
    sub: String,
    iat: i64,
    exp: i64,
    username: String,
    /// Password hash snapshot at issue time. Never compared on validation.
    password: String,
    #[serde(rename = "webauthnID")]
    webauthn_id: Uuid,
    #[serde(rename = "profilePictureID")]
    profile_picture_id: Option<i64>,
}

/// Issues and verifies self-contained signed bearer tokens.
///
/// Pure computation, no locks, safe to share across request tasks.
pub struct TokenService {
    // ---
    issuer: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    // ---
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        // ---
        // Restricting to HS256 makes the decoder reject any token whose
        // header names a different algorithm.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 5;

        Self {
            issuer: issuer.into(),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a token for `identity`, valid for `ttl` from now.
    pub fn issue(&self, identity: &Identity, ttl: Duration) -> Result<String, TokenError> {
        // ---
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: identity.id.to_string(),
            iat: now,
            exp: now + ttl.as_secs() as i64,
            username: identity.username.clone(),
            password: identity.password_hash.clone(),
            webauthn_id: identity.webauthn_id,
            profile_picture_id: identity.profile_picture_id,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::ClaimsInvalid)
    }

    /// Verify a token and reconstruct the identity it embeds.
    ///
    /// Checks signature, algorithm and expiry; no storage round-trip.
    pub fn validate(&self, token: &str) -> Result<Identity, TokenError> {
        // ---
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;

        let id: i64 = data
            .claims
            .sub
            .parse()
            .map_err(|_| TokenError::ClaimsInvalid)?;

        Ok(Identity {
            id,
            username: data.claims.username,
            password_hash: data.claims.password,
            webauthn_id: data.claims.webauthn_id,
            profile_picture_id: data.claims.profile_picture_id,
        })
    }
}
