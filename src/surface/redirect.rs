//! Page-navigation gate.
//!
//! Classifies each navigation request and applies the redirect policy:
//! the public auth entry page, a fixed allow-list of bootstrap assets, and
//! everything else protected. Failures on this surface become redirects,
//! never error pages. Authentication is cookie-only here; browsers do not
//! attach bearer headers to navigations.

use crate::app_state::AppState;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use url::form_urlencoded;

/// Path of the public authentication entry page.
pub const AUTH_PAGE: &str = "/auth";

/// Static/bootstrap assets served regardless of authentication state.
const ASSET_ALLOW_LIST: &[&str] = &["/_app", "/favicon.png", "/icon.png"];

#[derive(Debug, PartialEq, Eq)]
enum PathClass {
    // ---
    AuthPage,
    Asset,
    Protected,
}

fn classify(path: &str) -> PathClass {
    // ---
    if path == AUTH_PAGE || path.starts_with("/auth/") {
        return PathClass::AuthPage;
    }

    for prefix in ASSET_ALLOW_LIST {
        if path == *prefix || path.starts_with(&format!("{prefix}/")) {
            return PathClass::Asset;
        }
    }

    PathClass::Protected
}

/// Gate middleware for the page surface.
pub async fn redirect_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    // ---
    let path = req.uri().path().to_owned();
    let cookie = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let identity = state.resolver().resolve_cookie(cookie.as_deref());

    match (classify(&path), identity) {
        // Already signed in; the entry page has nothing to offer.
        (PathClass::AuthPage, Some(_)) => Redirect::to("/").into_response(),
        (PathClass::AuthPage, None) => next.run(req).await,

        (PathClass::Asset, _) => next.run(req).await,

        (PathClass::Protected, Some(identity)) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        (PathClass::Protected, None) => {
            // Preserve the original destination for after login.
            let redir: String = form_urlencoded::byte_serialize(path.as_bytes()).collect();
            Redirect::to(&format!("{AUTH_PAGE}?redir={redir}")).into_response()
        }
    }
}
