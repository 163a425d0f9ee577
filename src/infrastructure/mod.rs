mod database;
pub mod metrics;
mod webauthn;

// Re-export the factory functions for easy access
pub use database::create_postgres_store;
pub use metrics::{create_noop_metrics, create_prom_metrics};
pub use webauthn::create_webauthn;
