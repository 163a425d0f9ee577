//! Page-surface redirect policy tests.
//!
//! The gate is cookie-only: bearer headers are ignored on navigations.

mod common;

use common::TestServer;

#[tokio::test]
async fn anonymous_protected_page_redirects_to_auth() {
    // ---
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/dashboard"))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection(), "{}", response.status());
    assert_eq!(
        response.headers()[reqwest::header::LOCATION],
        "/auth?redir=%2Fdashboard"
    );
}

#[tokio::test]
async fn anonymous_auth_page_served() {
    // ---
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/auth"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn authenticated_auth_page_redirects_home() {
    // ---
    let server = TestServer::new().await;
    server.signup("nina", "nina password").await;
    let (_, cookie) = server.login("nina", "nina password").await;

    let response = server
        .client
        .get(server.url("/auth"))
        .header(reqwest::header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[reqwest::header::LOCATION], "/");
}

#[tokio::test]
async fn authenticated_home_page_served() {
    // ---
    let server = TestServer::new().await;
    server.signup("oscar", "oscar password").await;
    let (_, cookie) = server.login("oscar", "oscar password").await;

    let response = server
        .client
        .get(server.url("/"))
        .header(reqwest::header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("oscar"));
}

#[tokio::test]
async fn bearer_header_does_not_satisfy_the_gate() {
    // ---
    let server = TestServer::new().await;
    server.signup("peggy", "peggy password").await;
    let (token, _) = server.login("peggy", "peggy password").await;

    let response = server
        .client
        .get(server.url("/dashboard"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection());
}

#[tokio::test]
async fn assets_pass_the_gate_anonymously() {
    // ---
    let server = TestServer::new().await;

    // No asset is actually served in this build; the point is that the gate
    // does not redirect, so the request reaches the page fallback.
    let response = server
        .client
        .get(server.url("/favicon.png"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = server
        .client
        .get(server.url("/_app/immutable/chunk.js"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn redirect_preserves_query_free_path_only() {
    // ---
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/reports/2024"))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers()[reqwest::header::LOCATION],
        "/auth?redir=%2Freports%2F2024"
    );
}
