//! Traits for token and CSRF collaborators
//!
//! These traits enable dependency injection and testing by abstracting the
//! external session owner (silent refresh, cookie/meta-tag CSRF sources).

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by the token collaborator
#[derive(Debug, Error)]
pub enum AuthError {
    /// The refresh routine ran and failed (expired session, revoked grant)
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// No session exists to refresh
    #[error("Not authenticated")]
    NotAuthenticated,
}

/// Trait for providing bearer tokens
///
/// The implementor owns the token lifecycle: storage, expiry tracking, and
/// the silent-refresh flow. The HTTP client only reads the current token and
/// triggers a refresh when the API rejects one.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current access token, if a session exists.
    async fn bearer_token(&self) -> Option<String>;

    /// Obtain a fresh access token without user interaction.
    ///
    /// # Errors
    /// Returns error if no session exists or the refresh flow fails.
    async fn refresh(&self) -> Result<(), AuthError>;
}

/// Trait for providing the anti-CSRF header on mutating requests
#[async_trait]
pub trait CsrfTokenProvider: Send + Sync {
    /// Header name the API expects the token under.
    fn header_name(&self) -> &str {
        "X-CSRF-Token"
    }

    /// Current CSRF token, if one is available.
    async fn token(&self) -> Option<String>;
}
