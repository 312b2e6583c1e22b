//! Built-in collaborator implementations
//!
//! Cover the two degenerate cases every deployment needs: anonymous access
//! (public content endpoints) and fixed tokens (tests, server-to-server
//! scripts). Real deployments implement the traits over their session store.

use async_trait::async_trait;

use super::traits::{AuthError, CsrfTokenProvider, TokenProvider};

/// Anonymous access: no token, and nothing to refresh.
#[derive(Debug, Clone, Default)]
pub struct NoAuth;

#[async_trait]
impl TokenProvider for NoAuth {
    async fn bearer_token(&self) -> Option<String> {
        None
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        Err(AuthError::NotAuthenticated)
    }
}

/// A fixed bearer token that cannot be refreshed.
#[derive(Debug, Clone)]
pub struct StaticBearerToken {
    token: String,
}

impl StaticBearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl TokenProvider for StaticBearerToken {
    async fn bearer_token(&self) -> Option<String> {
        Some(self.token.clone())
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        Err(AuthError::RefreshFailed("static token cannot be refreshed".to_string()))
    }
}

/// No CSRF protection (API deployments that rely on bearer auth alone).
#[derive(Debug, Clone, Default)]
pub struct NoCsrf;

#[async_trait]
impl CsrfTokenProvider for NoCsrf {
    async fn token(&self) -> Option<String> {
        None
    }
}

/// A fixed CSRF token under the default header name.
#[derive(Debug, Clone)]
pub struct StaticCsrfToken {
    token: String,
}

impl StaticCsrfToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl CsrfTokenProvider for StaticCsrfToken {
    async fn token(&self) -> Option<String> {
        Some(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_auth_has_no_token() {
        let provider = NoAuth;
        assert_eq!(provider.bearer_token().await, None);
        assert!(matches!(provider.refresh().await, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_static_bearer_token() {
        let provider = StaticBearerToken::new("tok-123");
        assert_eq!(provider.bearer_token().await, Some("tok-123".to_string()));
        assert!(matches!(provider.refresh().await, Err(AuthError::RefreshFailed(_))));
    }

    #[tokio::test]
    async fn test_csrf_providers() {
        let none = NoCsrf;
        assert_eq!(none.token().await, None);
        assert_eq!(none.header_name(), "X-CSRF-Token");

        let fixed = StaticCsrfToken::new("csrf-abc");
        assert_eq!(fixed.token().await, Some("csrf-abc".to_string()));
    }
}
