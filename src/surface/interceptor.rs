//! RPC-surface middleware.
//!
//! `attach_identity` resolves a bearer credential (cookie first, then
//! `Authorization` header) and attaches the identity to the request; it
//! never rejects. `throttle` applies the rate limiter to the subtree it
//! wraps. `track_requests` feeds the HTTP metrics histogram.

use crate::app_state::AppState;
use crate::error::ApiError;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;

/// Pass-through authentication for the RPC surface.
///
/// Applied uniformly to every inbound call; handlers that need an identity
/// enforce it via the `Caller` extractor.
pub async fn attach_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    // ---
    let cookie = header_str(&req, header::COOKIE);
    let authorization = header_str(&req, header::AUTHORIZATION);

    if let Some(identity) = state
        .resolver()
        .resolve(cookie.as_deref(), authorization.as_deref())
    {
        req.extensions_mut().insert(identity);
    }

    next.run(req).await
}

/// Per-client throttle for the unauthenticated entry points.
pub async fn throttle(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // ---
    let client_id = header_str(&req, header::USER_AGENT).unwrap_or_default();

    if !state.rate_limiter().allow(&client_id) {
        state.metrics().record_rate_limited();
        return Err(ApiError::resource_exhausted("rate limit exceeded"));
    }

    Ok(next.run(req).await)
}

/// Records duration and status for every request passing through.
pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    // ---
    let start = Instant::now();
    let path = req.uri().path().to_owned();
    let method = req.method().clone();

    let response = next.run(req).await;

    state
        .metrics()
        .record_http_request(start, &path, method.as_str(), response.status().as_u16());

    response
}

fn header_str(req: &Request, name: header::HeaderName) -> Option<String> {
    // ---
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
