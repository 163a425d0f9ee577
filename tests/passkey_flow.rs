//! Passkey ceremony surface tests.
//!
//! A real authenticator cannot participate here, so these cover the
//! server-side half: challenge issuance, ceremony-session lifecycle, and
//! rejection of malformed or out-of-order responses.

mod common;

use common::TestServer;
use serde_json::json;

#[tokio::test]
async fn login_begin_unknown_user_rejected() {
    // ---
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/api/v1/auth/passkey/login/begin"))
        .json(&json!({ "username": "ghost" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn login_begin_without_passkeys_rejected() {
    // ---
    let server = TestServer::new().await;
    server.signup("ivan", "ivan password").await;

    // Identity exists but owns no credentials; same opaque failure as an
    // unknown user.
    let response = server
        .client
        .post(server.url("/api/v1/auth/passkey/login/begin"))
        .json(&json!({ "username": "ivan" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "unauthenticated");
}

#[tokio::test]
async fn login_finish_without_begin_rejected() {
    // ---
    let server = TestServer::new().await;
    server.signup("judy", "judy password").await;

    let response = server
        .client
        .post(server.url("/api/v1/auth/passkey/login/finish"))
        .json(&json!({ "username": "judy", "assertion": "{}" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "invalid_argument");
}

#[tokio::test]
async fn register_begin_requires_authentication() {
    // ---
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/api/v1/auth/passkey/register/begin"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn register_begin_issues_creation_options() {
    // ---
    let server = TestServer::new().await;
    server.signup("kim", "kim password").await;
    let (token, _) = server.login("kim", "kim password").await;

    let response = server
        .client
        .post(server.url("/api/v1/auth/passkey/register/begin"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();

    let options: serde_json::Value =
        serde_json::from_str(body["options_json"].as_str().expect("options_json"))
            .expect("options_json should be valid JSON");

    // Standard creation-options shape from the ceremony library.
    assert!(options["publicKey"]["challenge"].is_string());
    assert_eq!(options["publicKey"]["rp"]["id"], "localhost");
    assert_eq!(options["publicKey"]["user"]["name"], "kim");
}

#[tokio::test]
async fn register_finish_without_begin_rejected() {
    // ---
    let server = TestServer::new().await;
    server.signup("leo", "leo password").await;
    let (token, _) = server.login("leo", "leo password").await;

    let response = server
        .client
        .post(server.url("/api/v1/auth/passkey/register/finish"))
        .bearer_auth(&token)
        .json(&json!({ "attestation": "{}" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "invalid_argument");
}

#[tokio::test]
async fn register_finish_rejects_garbage_attestation() {
    // ---
    let server = TestServer::new().await;
    server.signup("mallory", "mallory password").await;
    let (token, _) = server.login("mallory", "mallory password").await;

    // Park a real ceremony session first.
    let response = server
        .client
        .post(server.url("/api/v1/auth/passkey/register/begin"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = server
        .client
        .post(server.url("/api/v1/auth/passkey/register/finish"))
        .bearer_auth(&token)
        .json(&json!({ "attestation": "this is not json" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);

    // The session was consumed by the failed finish; a retry needs a new
    // begin.
    let response = server
        .client
        .post(server.url("/api/v1/auth/passkey/register/finish"))
        .bearer_auth(&token)
        .json(&json!({ "attestation": "this is not json" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "ceremony session missing or expired");
}
