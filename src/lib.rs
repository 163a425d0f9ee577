// src/lib.rs
use anyhow::Result;
use app_state::AppState;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::env;
use std::sync::Arc;
use std::time::Duration;

use auth::{AuthResolver, CeremonyStore, IdentityGateway, RateLimiter, TokenService};
use domain::{IdentityStorePtr, MetricsPtr};

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod app_state;
mod auth;
mod config;
mod error;
mod handlers;
mod infrastructure;
mod surface;

pub use config::*;
pub use error::{ApiError, ErrorCode};

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_noop_metrics, // ---
    create_postgres_store,
    create_prom_metrics,
    create_webauthn,
};

/// Build the HTTP router with storage and metrics determined by environment
/// variables. Connects to Postgres (with retries) before returning.
pub async fn create_router() -> Result<Router> {
    // ---
    // Load all configuration from environment
    let config = AppConfig::from_env()?;

    // Determine metrics implementation from environment
    let metrics_type = env::var("AUTHGATE_METRICS_TYPE").unwrap_or_else(|_| "noop".to_string());
    let metrics = if metrics_type == "prom" {
        create_prom_metrics()?
    } else {
        create_noop_metrics()?
    };

    tracing_subscriber::fmt::try_init().ok(); // ignores if already initialized

    let store = create_postgres_store(&config.database).await?;

    build_router(
        &config.auth,
        &config.webauthn,
        &config.rate_limit,
        &config.ceremony,
        store,
        metrics,
    )
}

/// Build the HTTP router against explicitly injected storage and metrics.
///
/// Non-database configuration is still read from the environment. Must be
/// called from within a Tokio runtime (the maintenance task is spawned
/// here).
pub fn create_router_with(store: IdentityStorePtr, metrics: MetricsPtr) -> Result<Router> {
    // ---
    let auth_cfg = AuthConfig::from_env()?;
    let webauthn_cfg = WebAuthnConfig::from_env()?;
    let rate_cfg = RateLimitConfig::from_env()?;
    let ceremony_cfg = CeremonyConfig::from_env()?;

    build_router(
        &auth_cfg,
        &webauthn_cfg,
        &rate_cfg,
        &ceremony_cfg,
        store,
        metrics,
    )
}

fn build_router(
    auth_cfg: &AuthConfig,
    webauthn_cfg: &WebAuthnConfig,
    rate_cfg: &RateLimitConfig,
    ceremony_cfg: &CeremonyConfig,
    store: IdentityStorePtr,
    metrics: MetricsPtr,
) -> Result<Router> {
    // ---
    // Create the auth core with all dependencies explicit
    let tokens = Arc::new(TokenService::new(&auth_cfg.jwt_secret, &auth_cfg.issuer));
    let resolver = Arc::new(AuthResolver::new(tokens.clone()));
    let ceremonies = Arc::new(CeremonyStore::new(ceremony_cfg.session_ttl));
    let rate_limiter = Arc::new(RateLimiter::new(
        rate_cfg.per_second,
        rate_cfg.burst,
        rate_cfg.idle_after,
    ));
    let gateway = Arc::new(IdentityGateway::new(store));
    let webauthn = Arc::new(create_webauthn(webauthn_cfg)?);

    spawn_janitor(
        ceremonies.clone(),
        rate_limiter.clone(),
        rate_cfg.sweep_interval,
    );

    // Build application state with all dependencies
    let app_state = AppState::new(
        tokens,
        resolver,
        ceremonies,
        rate_limiter,
        gateway,
        webauthn,
        metrics,
        auth_cfg.token_ttl,
        auth_cfg.api_key_ttl,
    );

    // Unauthenticated entry points, throttled per client
    let auth_routes = Router::new()
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/passkey/login/begin", post(handlers::passkey_login_begin))
        .route(
            "/passkey/login/finish",
            post(handlers::passkey_login_finish),
        )
        .route(
            "/passkey/register/begin",
            post(handlers::passkey_register_begin),
        )
        .route(
            "/passkey/register/finish",
            post(handlers::passkey_register_finish),
        )
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            surface::throttle,
        ));

    // Authenticated identity management
    let user_routes = Router::new()
        .route("/", get(handlers::get_user))
        .route("/password", put(handlers::update_password))
        .route("/api-key", post(handlers::api_key))
        .route("/credentials", get(handlers::list_credentials))
        .route("/credentials/{id}", delete(handlers::delete_credential));

    // RPC surface: pass-through identity resolution applies to every call
    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/user", user_routes)
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            surface::attach_identity,
        ));

    // Page surface: cookie-only, failures become redirects
    let pages = Router::new()
        .route("/", get(handlers::home_page))
        .route(surface::AUTH_PAGE, get(handlers::auth_page))
        .fallback(handlers::page_fallback)
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            surface::redirect_gate,
        ));

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/v1", api)
        .merge(pages)
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            surface::track_requests,
        ))
        .with_state(app_state);

    Ok(router)
}

/// Spawns the single background maintenance task: expired ceremony sessions
/// and idle rate-limit visitors are swept on one shared interval.
fn spawn_janitor(
    ceremonies: Arc<CeremonyStore>,
    rate_limiter: Arc<RateLimiter>,
    sweep_interval: Duration,
) {
    // ---
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let expired = ceremonies.evict_expired();
            let idle = rate_limiter.evict_idle();

            if expired > 0 || idle > 0 {
                tracing::debug!(
                    "janitor sweep: {expired} expired ceremonies, {idle} idle visitors"
                );
            }
        }
    });
}
