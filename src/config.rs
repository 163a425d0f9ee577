// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.

use anyhow::Result;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads a required environment variable.
///
/// Missing configuration is treated as a deployment error,
/// not a recoverable runtime condition.
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a missing
/// required environment variable.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// The single source of truth for startup configuration; all required
/// values are validated eagerly during initialization.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: database::DatabaseConfig,
    pub auth: auth::AuthConfig,
    pub webauthn: webauthn::WebAuthnConfig,
    pub rate_limit: rate_limit::RateLimitConfig,
    pub ceremony: ceremony::CeremonyConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the
    /// environment. Intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            database: database::DatabaseConfig::from_env()?,
            auth: auth::AuthConfig::from_env()?,
            webauthn: webauthn::WebAuthnConfig::from_env()?,
            rate_limit: rate_limit::RateLimitConfig::from_env()?,
            ceremony: ceremony::CeremonyConfig::from_env()?,
        })
    }
}

// ============================================================
// Database configuration
// ============================================================

mod database {
    // ---
    use super::*;

    /// Database-related configuration derived from environment variables.
    #[derive(Debug, Clone)]
    pub struct DatabaseConfig {
        /// PostgreSQL connection string.
        pub database_url: String,

        /// Number of retry attempts when initializing the database connection. Defaults to 50.
        pub retry_count: u32,

        /// Maximum time to wait when acquiring a connection from the pool. Defaults to 30 seconds.
        pub acquire_timeout: Duration,

        /// Minimum number of connections to keep in the pool, even when idle. Defaults to 2.
        pub min_connections: u32,

        /// Maximum number of connections to be open concurrently. Defaults to 15.
        pub max_connections: u32,
    }

    impl DatabaseConfig {
        /// Builds a [`DatabaseConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if required configuration is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let database_url = required_env!("DATABASE_URL");
            let retry_count = optional_env_parse!("AUTHGATE_DB_RETRY_COUNT", u32, 50);
            let acquire_timeout_secs =
                optional_env_parse!("AUTHGATE_DB_ACQUIRE_TIMEOUT_SEC", u64, 30);
            let min_connections = optional_env_parse!("AUTHGATE_DB_MIN_CONNECTIONS", u32, 2);
            let max_connections = optional_env_parse!("AUTHGATE_DB_MAX_CONNECTIONS", u32, 15);

            Ok(Self {
                database_url,
                retry_count,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                min_connections,
                max_connections,
            })
        }
    }
}
pub use database::DatabaseConfig;

// ============================================================
// Token / credential configuration
// ============================================================

mod auth {
    // ---
    use super::*;

    /// Bearer-token configuration.
    ///
    /// The signing key is security-critical and must be explicitly
    /// provided; there is no default.
    #[derive(Debug, Clone)]
    pub struct AuthConfig {
        /// Symmetric HMAC signing key for bearer tokens.
        pub jwt_secret: String,

        /// Issuer claim stamped into every token.
        pub issuer: String,

        /// Session token (and cookie Max-Age) lifetime. Defaults to 8 hours.
        pub token_ttl: Duration,

        /// Lifetime for explicitly requested API keys. Defaults to 365 days.
        pub api_key_ttl: Duration,
    }

    impl AuthConfig {
        /// Builds an [`AuthConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if required configuration is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let jwt_secret = required_env!("AUTHGATE_JWT_SECRET");
            let issuer = std::env::var("AUTHGATE_ISSUER").unwrap_or_else(|_| "authgate".to_string());
            let token_ttl_secs = optional_env_parse!("AUTHGATE_TOKEN_TTL_SEC", u64, 28_800);
            let api_key_ttl_secs =
                optional_env_parse!("AUTHGATE_API_KEY_TTL_SEC", u64, 31_536_000);

            Ok(Self {
                jwt_secret,
                issuer,
                token_ttl: Duration::from_secs(token_ttl_secs),
                api_key_ttl: Duration::from_secs(api_key_ttl_secs),
            })
        }
    }
}
pub use auth::AuthConfig;

// ============================================================
// WebAuthn configuration
// ============================================================

mod webauthn {
    // ---
    use super::*;

    /// WebAuthn / Passkeys configuration.
    ///
    /// These values define the relying party identity and security
    /// origin used during registration and authentication ceremonies.
    #[derive(Debug, Clone)]
    pub struct WebAuthnConfig {
        /// Relying Party ID (typically a domain name).
        pub rp_id: String,

        /// Human-readable Relying Party name.
        pub rp_name: String,

        /// Fully-qualified origin (e.g. https://example.com).
        pub origin: String,
    }

    impl WebAuthnConfig {
        /// Builds a [`WebAuthnConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if required configuration is missing.
        /// WebAuthn configuration is security-critical and must be
        /// explicitly provided.
        pub fn from_env() -> Result<Self> {
            // ---
            let rp_id = required_env!("AUTHGATE_RP_ID");
            let origin = required_env!("AUTHGATE_ORIGIN");

            let rp_name =
                std::env::var("AUTHGATE_RP_NAME").unwrap_or_else(|_| "Authgate".to_string());

            Ok(Self {
                rp_id,
                rp_name,
                origin,
            })
        }
    }
}
pub use webauthn::WebAuthnConfig;

// ============================================================
// Rate limiting configuration
// ============================================================

mod rate_limit {
    // ---
    use super::*;

    /// Token-bucket throttle tuning for the unauthenticated entry points.
    #[derive(Debug, Clone)]
    pub struct RateLimitConfig {
        /// Bucket refill rate, tokens per second. Defaults to 1.
        pub per_second: f64,

        /// Bucket capacity (burst size). Defaults to 3.
        pub burst: u32,

        /// Visitors idle longer than this are evicted. Defaults to 3 minutes.
        pub idle_after: Duration,

        /// Janitor sweep interval. Defaults to 1 minute.
        pub sweep_interval: Duration,
    }

    impl RateLimitConfig {
        /// Builds a [`RateLimitConfig`] from environment variables.
        pub fn from_env() -> Result<Self> {
            // ---
            let per_second = optional_env_parse!("AUTHGATE_RATE_PER_SEC", f64, 1.0);
            let burst = optional_env_parse!("AUTHGATE_RATE_BURST", u32, 3);
            let idle_secs = optional_env_parse!("AUTHGATE_RATE_IDLE_SEC", u64, 180);
            let sweep_secs = optional_env_parse!("AUTHGATE_SWEEP_INTERVAL_SEC", u64, 60);

            Ok(Self {
                per_second,
                burst,
                idle_after: Duration::from_secs(idle_secs),
                sweep_interval: Duration::from_secs(sweep_secs),
            })
        }
    }
}
pub use rate_limit::RateLimitConfig;

// ============================================================
// Ceremony configuration
// ============================================================

mod ceremony {
    // ---
    use super::*;

    /// In-flight ceremony session tuning.
    #[derive(Debug, Clone)]
    pub struct CeremonyConfig {
        /// Time-to-live for an unconsumed ceremony session. Defaults to
        /// 5 minutes.
        pub session_ttl: Duration,
    }

    impl CeremonyConfig {
        /// Builds a [`CeremonyConfig`] from environment variables.
        pub fn from_env() -> Result<Self> {
            // ---
            let ttl_secs = optional_env_parse!("AUTHGATE_CEREMONY_TTL_SEC", u64, 300);

            Ok(Self {
                session_ttl: Duration::from_secs(ttl_secs),
            })
        }
    }
}
pub use ceremony::CeremonyConfig;

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use anyhow::Result;
    use serial_test::serial;

    #[test]
    #[serial]
    fn missing_database_url_fails() -> Result<()> {
        // ---
        std::env::remove_var("DATABASE_URL");

        assert_missing_config!(database::DatabaseConfig::from_env(), "DATABASE_URL");

        Ok(())
    }

    #[test]
    #[serial]
    fn missing_jwt_secret_fails() -> Result<()> {
        // ---
        std::env::remove_var("AUTHGATE_JWT_SECRET");

        assert_missing_config!(auth::AuthConfig::from_env(), "AUTHGATE_JWT_SECRET");

        Ok(())
    }

    #[test]
    #[serial]
    fn auth_defaults_applied() -> Result<()> {
        // ---
        std::env::set_var("AUTHGATE_JWT_SECRET", "secret"); // required

        std::env::remove_var("AUTHGATE_ISSUER");
        std::env::remove_var("AUTHGATE_TOKEN_TTL_SEC");
        std::env::remove_var("AUTHGATE_API_KEY_TTL_SEC");

        let cfg = auth::AuthConfig::from_env()?;
        assert_eq!(cfg.issuer, "authgate");
        assert_eq!(cfg.token_ttl.as_secs(), 28_800);
        assert_eq!(cfg.api_key_ttl.as_secs(), 31_536_000);

        Ok(())
    }

    #[test]
    #[serial]
    fn rate_limit_overrides_defaults() -> Result<()> {
        // ---
        std::env::set_var("AUTHGATE_RATE_PER_SEC", "2.5");
        std::env::set_var("AUTHGATE_RATE_BURST", "10");
        std::env::set_var("AUTHGATE_RATE_IDLE_SEC", "60");
        std::env::set_var("AUTHGATE_SWEEP_INTERVAL_SEC", "15");

        let cfg = rate_limit::RateLimitConfig::from_env()?;
        assert_eq!(cfg.per_second, 2.5);
        assert_eq!(cfg.burst, 10);
        assert_eq!(cfg.idle_after.as_secs(), 60);
        assert_eq!(cfg.sweep_interval.as_secs(), 15);

        std::env::remove_var("AUTHGATE_RATE_PER_SEC");
        std::env::remove_var("AUTHGATE_RATE_BURST");
        std::env::remove_var("AUTHGATE_RATE_IDLE_SEC");
        std::env::remove_var("AUTHGATE_SWEEP_INTERVAL_SEC");

        Ok(())
    }

    #[test]
    #[serial]
    fn app_config_from_env_success() -> Result<()> {
        // ---
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("AUTHGATE_JWT_SECRET", "secret");
        std::env::set_var("AUTHGATE_RP_ID", "example.com");
        std::env::set_var("AUTHGATE_ORIGIN", "https://example.com");

        let cfg = AppConfig::from_env()?;
        assert_eq!(cfg.webauthn.rp_name, "Authgate");
        assert_eq!(cfg.ceremony.session_ttl.as_secs(), 300);

        Ok(())
    }
}
