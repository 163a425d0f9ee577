//! Unified credential extraction.
//!
//! Both transport surfaces (page navigation and RPC) authenticate the same
//! way: a `token` cookie first, then an `Authorization: Bearer` header.
//! This used to be duplicated per surface in the system this replaces; the
//! single resolver here is consumed by thin transport-specific adapters.

use crate::auth::token::TokenService;
use crate::domain::Identity;
use std::sync::Arc;
use std::time::Duration;

/// Name of the session cookie.
pub const COOKIE_NAME: &str = "token";

/// Resolves raw credential headers into a verified identity.
///
/// Validation failures are swallowed into `None`: authentication is optional
/// at this layer, handlers decide whether an identity is required.
pub struct AuthResolver {
    // ---
    tokens: Arc<TokenService>,
}

impl AuthResolver {
    // ---
    pub fn new(tokens: Arc<TokenService>) -> Self {
        // ---
        Self { tokens }
    }

    /// Try the cookie, then the bearer header. `None` means no verifiable
    /// credential was presented.
    pub fn resolve(
        &self,
        cookie_header: Option<&str>,
        authorization: Option<&str>,
    ) -> Option<Identity> {
        // ---
        if let Some(raw) = cookie_header {
            if let Some(value) = cookie_value(raw, COOKIE_NAME) {
                match self.tokens.validate(value) {
                    Ok(identity) => return Some(identity),
                    Err(err) => tracing::debug!("cookie token rejected: {err}"),
                }
            }
        }

        if let Some(header) = authorization {
            if let Some(value) = header.strip_prefix("Bearer ") {
                match self.tokens.validate(value) {
                    Ok(identity) => return Some(identity),
                    Err(err) => tracing::debug!("bearer token rejected: {err}"),
                }
            }
        }

        None
    }

    /// Cookie-only resolution for the page surface; browsers do not attach
    /// bearer headers to navigation requests.
    pub fn resolve_cookie(&self, cookie_header: Option<&str>) -> Option<Identity> {
        // ---
        self.resolve(cookie_header, None)
    }
}

/// Extract a cookie value by name from a raw `Cookie` header.
fn cookie_value<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    // ---
    raw.split(';')
        .map(str::trim)
        .find_map(|pair| match pair.split_once('=') {
            Some((k, v)) if k == name => Some(v),
            _ => None,
        })
}

/// Build the Set-Cookie value carrying a freshly minted session token.
pub fn session_cookie(token: &str, max_age: Duration) -> String {
    // ---
    format!(
        "{COOKIE_NAME}={token}; Path=/; Max-Age={}; HttpOnly; Secure; SameSite=Strict",
        max_age.as_secs()
    )
}

/// Build the Set-Cookie value that clears the session cookie.
pub fn clear_session_cookie() -> String {
    // ---
    format!("{COOKIE_NAME}=; Path=/; Max-Age=0; HttpOnly; Secure; SameSite=Strict")
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::domain::Identity;
    use uuid::Uuid;

    fn resolver_and_token() -> (AuthResolver, String) {
        // ---
        let tokens = Arc::new(TokenService::new("test-secret", "authgate"));
        let identity = Identity {
            id: 1,
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            webauthn_id: Uuid::new_v4(),
            profile_picture_id: None,
        };
        let token = tokens
            .issue(&identity, Duration::from_secs(3600))
            .unwrap();
        (AuthResolver::new(tokens), token)
    }

    #[test]
    fn cookie_value_parsing() {
        // ---
        assert_eq!(cookie_value("token=abc", "token"), Some("abc"));
        assert_eq!(cookie_value("a=1; token=abc; b=2", "token"), Some("abc"));
        assert_eq!(cookie_value("a=1;  token=abc", "token"), Some("abc"));
        assert_eq!(cookie_value("nottoken=abc", "token"), None);
        assert_eq!(cookie_value("", "token"), None);
    }

    #[test]
    fn resolves_from_cookie() {
        // ---
        let (resolver, token) = resolver_and_token();
        let cookie = format!("theme=dark; token={token}");
        let identity = resolver.resolve(Some(&cookie), None).unwrap();
        assert_eq!(identity.username, "alice");
    }

    #[test]
    fn resolves_from_bearer_header() {
        // ---
        let (resolver, token) = resolver_and_token();
        let header = format!("Bearer {token}");
        let identity = resolver.resolve(None, Some(&header)).unwrap();
        assert_eq!(identity.id, 1);
    }

    #[test]
    fn invalid_cookie_falls_back_to_bearer() {
        // ---
        let (resolver, token) = resolver_and_token();
        let header = format!("Bearer {token}");
        let identity = resolver
            .resolve(Some("token=garbage"), Some(&header))
            .unwrap();
        assert_eq!(identity.username, "alice");
    }

    #[test]
    fn no_credentials_resolves_to_none() {
        // ---
        let (resolver, token) = resolver_and_token();
        assert!(resolver.resolve(None, None).is_none());
        // Bearer token in the cookie slot is not a cookie.
        assert!(resolver.resolve(Some(&token), None).is_none());
        // Missing scheme prefix.
        assert!(resolver.resolve(None, Some(&token)).is_none());
    }

    #[test]
    fn cookie_only_resolution_ignores_bearer() {
        // ---
        let (resolver, token) = resolver_and_token();
        assert!(resolver.resolve_cookie(None).is_none());
        let cookie = format!("token={token}");
        assert!(resolver.resolve_cookie(Some(&cookie)).is_some());
    }

    #[test]
    fn cookie_attributes() {
        // ---
        let cookie = session_cookie("abc", Duration::from_secs(28800));
        assert_eq!(
            cookie,
            "token=abc; Path=/; Max-Age=28800; HttpOnly; Secure; SameSite=Strict"
        );
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
