// Test helpers are intentionally partially used
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use anyhow::Result;
use authgate::domain::{Identity, IdentityStore, StoredCredential};
use authgate::{create_noop_metrics, create_router_with};
use reqwest::Client;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::time::sleep;
use uuid::Uuid;

macro_rules! set_env_if_unset {
    // ---
    ($key:expr, $val:expr) => {
        if std::env::var($key).is_err() {
            std::env::set_var($key, $val);
        }
    };
}

static INIT: Once = Once::new();

// ============================================================================
// Test Setup
// ============================================================================

/// Initialize test environment variables once.
pub fn setup_test_env() {
    // ---
    INIT.call_once(|| {
        // ---
        set_env_if_unset!("AUTHGATE_JWT_SECRET", "test-secret-please-rotate");
        set_env_if_unset!("AUTHGATE_RP_ID", "localhost");
        set_env_if_unset!("AUTHGATE_ORIGIN", "http://localhost:8080");
        set_env_if_unset!("AUTHGATE_RP_NAME", "Test App");

        // Generous defaults so unrelated tests never trip the throttle;
        // the rate-limit suite pins its own values before this runs.
        set_env_if_unset!("AUTHGATE_RATE_PER_SEC", "1000");
        set_env_if_unset!("AUTHGATE_RATE_BURST", "1000");
    });
}

// ============================================================================
// In-memory identity store
// ============================================================================

/// Process-local [`IdentityStore`] so integration tests need no Postgres.
pub struct MemoryStore {
    // ---
    next_id: AtomicI64,
    identities: Mutex<HashMap<i64, Identity>>,
    credentials: Mutex<Vec<StoredCredential>>,
}

impl MemoryStore {
    // ---
    pub fn new() -> Self {
        MemoryStore {
            next_id: AtomicI64::new(1),
            identities: Mutex::new(HashMap::new()),
            credentials: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IdentityStore for MemoryStore {
    // ---
    async fn create_identity(
        &self,
        username: &str,
        password_hash: &str,
        webauthn_id: Uuid,
    ) -> Result<Identity> {
        // ---
        let mut identities = self.identities.lock().unwrap();

        if identities.values().any(|i| i.username == username) {
            anyhow::bail!("unique constraint violation: username");
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let identity = Identity {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            webauthn_id,
            profile_picture_id: None,
        };
        identities.insert(id, identity.clone());

        Ok(identity)
    }

    async fn identity_by_name(&self, username: &str) -> Result<Option<Identity>> {
        // ---
        Ok(self
            .identities
            .lock()
            .unwrap()
            .values()
            .find(|i| i.username == username)
            .cloned())
    }

    async fn identity_by_id(&self, id: i64) -> Result<Option<Identity>> {
        // ---
        Ok(self.identities.lock().unwrap().get(&id).cloned())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        // ---
        if let Some(identity) = self.identities.lock().unwrap().get_mut(&id) {
            identity.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn credentials_for(&self, identity_id: i64) -> Result<Vec<StoredCredential>> {
        // ---
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.identity_id == identity_id)
            .cloned()
            .collect())
    }

    async fn credential_by_id(
        &self,
        credential_id: &[u8],
        identity_id: i64,
    ) -> Result<Option<StoredCredential>> {
        // ---
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == credential_id && c.identity_id == identity_id)
            .cloned())
    }

    async fn insert_credential(&self, credential: StoredCredential) -> Result<()> {
        // ---
        self.credentials.lock().unwrap().push(credential);
        Ok(())
    }

    async fn update_credential(&self, credential: StoredCredential) -> Result<()> {
        // ---
        let mut credentials = self.credentials.lock().unwrap();
        if let Some(slot) = credentials
            .iter_mut()
            .find(|c| c.id == credential.id && c.identity_id == credential.identity_id)
        {
            *slot = credential;
        }
        Ok(())
    }

    async fn delete_credential(&self, credential_id: &[u8], identity_id: i64) -> Result<bool> {
        // ---
        let mut credentials = self.credentials.lock().unwrap();
        let before = credentials.len();
        credentials.retain(|c| !(c.id == credential_id && c.identity_id == identity_id));
        Ok(credentials.len() < before)
    }

    async fn ping(&self) -> Result<()> {
        // ---
        Ok(())
    }
}

// ============================================================================
// Test server
// ============================================================================

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---
    pub async fn new() -> Self {
        // ---
        setup_test_env();

        let store = Arc::new(MemoryStore::new());
        let metrics = create_noop_metrics().expect("noop metrics");
        let app = create_router_with(store, metrics).expect("Should be able to create router");

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        // No automatic redirects or cookie jar; tests assert on both.
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self { addr, client }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }

    /// Creates an identity through the public signup endpoint.
    pub async fn signup(&self, username: &str, password: &str) -> reqwest::Response {
        // ---
        self.client
            .post(self.url("/api/v1/auth/signup"))
            .json(&json!({
                "username": username,
                "password": password,
                "confirm_password": password,
            }))
            .send()
            .await
            .expect("signup request failed")
    }

    /// Password login; returns the bearer token and the session cookie pair
    /// (`token=...`) for manual Cookie headers.
    pub async fn login(&self, username: &str, password: &str) -> (String, String) {
        // ---
        let response = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("login request failed");

        assert_eq!(response.status(), 200, "login should succeed");

        let cookie = response
            .headers()
            .get(reqwest::header::SET_COOKIE)
            .expect("login should set a session cookie")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let body: serde_json::Value = response.json().await.expect("login body");
        let token = body["token"].as_str().expect("token field").to_string();

        (token, cookie)
    }
}
