//! Application state management.
//!
//! The shared state passed to all Axum handlers via the `State` extractor.
//! It is the dependency-injection container for the auth core: every piece
//! of shared mutable state (ceremony sessions, rate-limit visitors) is an
//! explicitly owned object living here, never a package-level global, so
//! lifetime and test isolation stay explicit.
//!
//! The struct is cheaply cloneable (everything heavy is behind an `Arc`)
//! and immutable after construction.

use crate::auth::{AuthResolver, CeremonyStore, IdentityGateway, RateLimiter, TokenService};
use crate::domain::MetricsPtr;
use std::sync::Arc;
use std::time::Duration;
use webauthn_rs::Webauthn;

/// Shared application state passed to all Axum handlers.
#[derive(Clone)]
pub(crate) struct AppState {
    // ---
    /// Token issue/verify service. Pure computation, lock-free.
    tokens: Arc<TokenService>,

    /// Unified cookie/bearer credential resolution, consumed by both the
    /// RPC interceptor and the page redirect gate.
    resolver: Arc<AuthResolver>,

    /// In-flight ceremony sessions (process-local, volatile).
    ceremonies: Arc<CeremonyStore>,

    /// Per-client throttle for the unauthenticated entry points.
    rate_limiter: Arc<RateLimiter>,

    /// Storage adapter for identities and credentials.
    gateway: Arc<IdentityGateway>,

    /// WebAuthn protocol handler, configured with the relying party
    /// identity. Wrapped in `Arc` because `Webauthn` is not `Clone`.
    webauthn: Arc<Webauthn>,

    /// Metrics implementation (Prometheus or no-op).
    metrics: MetricsPtr,

    /// Lifetime of session tokens and their cookie.
    token_ttl: Duration,

    /// Lifetime of explicitly requested API-key tokens.
    api_key_ttl: Duration,
}

impl AppState {
    // ---
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tokens: Arc<TokenService>,
        resolver: Arc<AuthResolver>,
        ceremonies: Arc<CeremonyStore>,
        rate_limiter: Arc<RateLimiter>,
        gateway: Arc<IdentityGateway>,
        webauthn: Arc<Webauthn>,
        metrics: MetricsPtr,
        token_ttl: Duration,
        api_key_ttl: Duration,
    ) -> Self {
        // ---
        AppState {
            tokens,
            resolver,
            ceremonies,
            rate_limiter,
            gateway,
            webauthn,
            metrics,
            token_ttl,
            api_key_ttl,
        }
    }

    pub(crate) fn tokens(&self) -> &TokenService {
        // ---
        &self.tokens
    }

    pub(crate) fn resolver(&self) -> &AuthResolver {
        // ---
        &self.resolver
    }

    pub(crate) fn ceremonies(&self) -> &CeremonyStore {
        // ---
        &self.ceremonies
    }

    pub(crate) fn rate_limiter(&self) -> &RateLimiter {
        // ---
        &self.rate_limiter
    }

    pub(crate) fn gateway(&self) -> &IdentityGateway {
        // ---
        &self.gateway
    }

    pub(crate) fn webauthn(&self) -> &Webauthn {
        // ---
        &self.webauthn
    }

    pub(crate) fn metrics(&self) -> &MetricsPtr {
        // ---
        &self.metrics
    }

    pub(crate) fn token_ttl(&self) -> Duration {
        // ---
        self.token_ttl
    }

    pub(crate) fn api_key_ttl(&self) -> Duration {
        // ---
        self.api_key_ttl
    }
}
