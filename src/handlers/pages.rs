//! Minimal page handlers behind the redirect gate.
//!
//! The real front-end is a separate asset bundle; these handlers exist so
//! the navigation surface has something to serve at the gate's two named
//! destinations. The gate attaches the identity for protected paths.

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};

use crate::domain::Identity;

/// GET / (protected; the gate has already attached an identity)
pub async fn home_page(identity: Option<Extension<Identity>>) -> impl IntoResponse {
    // ---
    let version = env!("CARGO_PKG_VERSION");
    let who = identity
        .map(|Extension(i)| i.username)
        .unwrap_or_else(|| "stranger".to_string());

    Html(format!(
        "<!doctype html><title>authgate</title>\
         <h1>Signed in as {who}</h1><p>authgate v{version}</p>"
    ))
}

/// GET /auth (public entry page)
pub async fn auth_page() -> impl IntoResponse {
    // ---
    Html(
        "<!doctype html><title>Sign in</title>\
         <h1>Sign in</h1><p>POST /api/v1/auth/login or use a passkey.</p>",
    )
}

/// Fallback for unmatched page paths. Only reachable by authenticated
/// navigation (anonymous requests were redirected by the gate).
pub async fn page_fallback() -> impl IntoResponse {
    // ---
    (StatusCode::NOT_FOUND, "not found")
}
