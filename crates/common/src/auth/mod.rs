//! Auth collaborator contracts
//!
//! The HTTP client never owns credentials. It reads a bearer token and asks
//! for a refresh through [`TokenProvider`], and sources its anti-CSRF header
//! through [`CsrfTokenProvider`]. Both are injected at construction time so
//! call sites and tests can swap implementations freely.

pub mod providers;
pub mod traits;

pub use providers::{NoAuth, NoCsrf, StaticBearerToken, StaticCsrfToken};
pub use traits::{AuthError, CsrfTokenProvider, TokenProvider};
