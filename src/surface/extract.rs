//! Typed access to the authenticated caller.
//!
//! The gate middleware attaches a verified [`Identity`] to the request
//! extensions; handlers that require one take a [`Caller`] parameter, making
//! the dependency visible in the signature instead of ambient.

use crate::domain::Identity;
use crate::error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// The verified identity attached to this request.
///
/// Extraction fails with Unauthenticated when no gate attached one, which is
/// how individual handlers opt in to requiring authentication under the
/// pass-through interceptor policy.
pub struct Caller(pub Identity);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // ---
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(Caller)
            .ok_or_else(|| ApiError::unauthenticated("could not authenticate"))
    }
}
