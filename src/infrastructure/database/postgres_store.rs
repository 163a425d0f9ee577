use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Identity, IdentityStore, StoredCredential};

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: i64,
    username: String,
    password_hash: String,
    webauthn_id: Uuid,
    profile_picture_id: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: Vec<u8>,
    identity_id: i64,
    public_key: Vec<u8>,
    sign_count: i64,
    transports: Option<String>,
    user_verified: bool,
    backup_eligible: bool,
    backup_state: bool,
    attestation_object: Option<Vec<u8>>,
    attestation_client_data: Option<Vec<u8>>,
    created_at: DateTime<Utc>,
    last_used: DateTime<Utc>,
}

impl From<IdentityRow> for Identity {
    // ---
    fn from(r: IdentityRow) -> Self {
        Identity {
            id: r.id,
            username: r.username,
            password_hash: r.password_hash,
            webauthn_id: r.webauthn_id,
            profile_picture_id: r.profile_picture_id,
        }
    }
}

impl From<CredentialRow> for StoredCredential {
    // ---
    fn from(r: CredentialRow) -> Self {
        StoredCredential {
            id: r.id,
            identity_id: r.identity_id,
            public_key: r.public_key,
            sign_count: r.sign_count,
            transports: r.transports,
            user_verified: r.user_verified,
            backup_eligible: r.backup_eligible,
            backup_state: r.backup_state,
            attestation_object: r.attestation_object,
            attestation_client_data: r.attestation_client_data,
            created_at: r.created_at,
            last_used: r.last_used,
        }
    }
}

pub struct PostgresIdentityStore {
    // ---
    pool: PgPool,
}

impl PostgresIdentityStore {
    // ---
    pub fn new(pool: PgPool) -> Self {
        // ---
        Self { pool }
    }
}

const IDENTITY_COLUMNS: &str = "id, username, password_hash, webauthn_id, profile_picture_id";

const CREDENTIAL_COLUMNS: &str = "id, identity_id, public_key, sign_count, transports, \
     user_verified, backup_eligible, backup_state, \
     attestation_object, attestation_client_data, created_at, last_used";

#[async_trait::async_trait]
impl IdentityStore for PostgresIdentityStore {
    // ---
    async fn create_identity(
        &self,
        username: &str,
        password_hash: &str,
        webauthn_id: Uuid,
    ) -> Result<Identity> {
        // ---
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO identities (username, password_hash, webauthn_id)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(username)
        .bind(password_hash)
        .bind(webauthn_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Identity {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            webauthn_id,
            profile_picture_id: None,
        })
    }

    async fn identity_by_name(&self, username: &str) -> Result<Option<Identity>> {
        // ---
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Identity::from))
    }

    async fn identity_by_id(&self, id: i64) -> Result<Option<Identity>> {
        // ---
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Identity::from))
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        // ---
        sqlx::query("UPDATE identities SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn credentials_for(&self, identity_id: i64) -> Result<Vec<StoredCredential>> {
        // ---
        let rows = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM credentials
             WHERE identity_id = $1 ORDER BY created_at"
        ))
        .bind(identity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StoredCredential::from).collect())
    }

    async fn credential_by_id(
        &self,
        credential_id: &[u8],
        identity_id: i64,
    ) -> Result<Option<StoredCredential>> {
        // ---
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM credentials
             WHERE id = $1 AND identity_id = $2"
        ))
        .bind(credential_id)
        .bind(identity_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StoredCredential::from))
    }

    async fn insert_credential(&self, credential: StoredCredential) -> Result<()> {
        // ---
        sqlx::query(
            "INSERT INTO credentials
                 (id, identity_id, public_key, sign_count, transports,
                  user_verified, backup_eligible, backup_state,
                  attestation_object, attestation_client_data, created_at, last_used)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&credential.id)
        .bind(credential.identity_id)
        .bind(&credential.public_key)
        .bind(credential.sign_count)
        .bind(&credential.transports)
        .bind(credential.user_verified)
        .bind(credential.backup_eligible)
        .bind(credential.backup_state)
        .bind(&credential.attestation_object)
        .bind(&credential.attestation_client_data)
        .bind(credential.created_at)
        .bind(credential.last_used)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_credential(&self, credential: StoredCredential) -> Result<()> {
        // ---
        sqlx::query(
            "UPDATE credentials
             SET public_key = $1, sign_count = $2,
                 user_verified = $3, backup_eligible = $4, backup_state = $5,
                 last_used = $6
             WHERE id = $7 AND identity_id = $8",
        )
        .bind(&credential.public_key)
        .bind(credential.sign_count)
        .bind(credential.user_verified)
        .bind(credential.backup_eligible)
        .bind(credential.backup_state)
        .bind(credential.last_used)
        .bind(&credential.id)
        .bind(credential.identity_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_credential(&self, credential_id: &[u8], identity_id: i64) -> Result<bool> {
        // ---
        let result = sqlx::query("DELETE FROM credentials WHERE id = $1 AND identity_id = $2")
            .bind(credential_id)
            .bind(identity_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<()> {
        // ---
        sqlx::query("SELECT 1").execute(&self.pool).await?;

        Ok(())
    }
}
