//! Throttle behavior on the unauthenticated auth subtree.
//!
//! This suite pins tight rate-limit settings before the shared test
//! environment applies its generous defaults, so it lives in its own
//! binary.

mod common;

use common::TestServer;
use serde_json::json;
use std::sync::Once;

static PIN_RATE_ENV: Once = Once::new();

fn pin_rate_env() {
    // ---
    PIN_RATE_ENV.call_once(|| {
        // Two requests of burst, then effectively no refill within a test.
        std::env::set_var("AUTHGATE_RATE_PER_SEC", "0.001");
        std::env::set_var("AUTHGATE_RATE_BURST", "2");
    });
}

async fn attempt_login(server: &TestServer, user_agent: &str) -> reqwest::StatusCode {
    // ---
    server
        .client
        .post(server.url("/api/v1/auth/login"))
        .header(reqwest::header::USER_AGENT, user_agent)
        .json(&json!({ "username": "nobody", "password": "wrong" }))
        .send()
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn burst_exhaustion_returns_resource_exhausted() {
    // ---
    pin_rate_env();
    let server = TestServer::new().await;

    // Burst of 2: both attempts reach the handler (and fail auth there).
    assert_eq!(attempt_login(&server, "burst-ua").await, 403);
    assert_eq!(attempt_login(&server, "burst-ua").await, 403);

    // Third is throttled before authentication runs.
    let response = server
        .client
        .post(server.url("/api/v1/auth/login"))
        .header(reqwest::header::USER_AGENT, "burst-ua")
        .json(&json!({ "username": "nobody", "password": "wrong" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 429);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "resource_exhausted");
}

#[tokio::test]
async fn distinct_clients_have_independent_buckets() {
    // ---
    pin_rate_env();
    let server = TestServer::new().await;

    assert_eq!(attempt_login(&server, "client-a").await, 403);
    assert_eq!(attempt_login(&server, "client-a").await, 403);
    assert_eq!(attempt_login(&server, "client-a").await, 429);

    // A different User-Agent gets a fresh bucket.
    assert_eq!(attempt_login(&server, "client-b").await, 403);
}

#[tokio::test]
async fn authenticated_surface_is_not_throttled() {
    // ---
    pin_rate_env();
    let server = TestServer::new().await;

    // The /api/v1/user subtree carries no throttle middleware.
    for _ in 0..5 {
        let response = server
            .client
            .get(server.url("/api/v1/user"))
            .header(reqwest::header::USER_AGENT, "user-surface-ua")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 401);
    }
}
