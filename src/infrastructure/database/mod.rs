//! Database pool initialization and the Postgres-backed identity store.

mod postgres_store;

pub use postgres_store::PostgresIdentityStore;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::domain::IdentityStorePtr;

/// Creates a Postgres-backed identity store from database configuration.
///
/// Connects with bounded retries so the service survives a database that
/// comes up slower than the application container, then verifies the
/// schema exists.
pub async fn create_postgres_store(config: &DatabaseConfig) -> Result<IdentityStorePtr> {
    // ---
    let pool = connect_with_retry(config).await?;
    ensure_schema(&pool).await?;

    Ok(Arc::new(PostgresIdentityStore::new(pool)))
}

async fn connect_with_retry(config: &DatabaseConfig) -> Result<PgPool> {
    // ---
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let result = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await;

        match result {
            Ok(pool) => {
                tracing::info!("database pool established (attempt {attempt})");
                return Ok(pool);
            }
            Err(err) if attempt < config.retry_count => {
                tracing::warn!(
                    "database connection attempt {attempt}/{} failed: {err}",
                    config.retry_count
                );
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(err) => {
                return Err(anyhow::anyhow!(
                    "database unreachable after {attempt} attempts: {err}"
                ));
            }
        }
    }
}

/// Creates the identity/credential tables if they do not exist yet.
async fn ensure_schema(pool: &PgPool) -> Result<()> {
    // ---
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS identities (
             id                 BIGSERIAL PRIMARY KEY,
             username           TEXT NOT NULL UNIQUE,
             password_hash      TEXT NOT NULL,
             webauthn_id        UUID NOT NULL,
             profile_picture_id BIGINT
         )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS credentials (
             id                      BYTEA PRIMARY KEY,
             identity_id             BIGINT NOT NULL
                                     REFERENCES identities(id) ON DELETE CASCADE,
             public_key              BYTEA NOT NULL,
             sign_count              BIGINT NOT NULL DEFAULT 0,
             transports              TEXT,
             user_verified           BOOLEAN NOT NULL DEFAULT FALSE,
             backup_eligible         BOOLEAN NOT NULL DEFAULT FALSE,
             backup_state            BOOLEAN NOT NULL DEFAULT FALSE,
             attestation_object      BYTEA,
             attestation_client_data BYTEA,
             created_at              TIMESTAMPTZ NOT NULL,
             last_used               TIMESTAMPTZ NOT NULL
         )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS credentials_identity_idx ON credentials(identity_id)")
        .execute(pool)
        .await?;

    Ok(())
}
