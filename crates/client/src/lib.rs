//! # Fundline Client
//!
//! Resilient HTTP client for the Fundline REST API.
//!
//! The client is layered: configuration resolves endpoints, the HTTP layer
//! performs single validated attempts under a hard timeout, the retry
//! coordinator re-runs transient failures with exponential backoff, and the
//! auth layer answers a 401 with one token refresh and one replay.
//!
//! # Architecture
//!
//! - `config`: environment-derived [`ApiConfig`] and endpoint resolution
//! - `http`: request execution, content-type validation, correlation ids
//! - `api`: the public [`ApiClient`] verb surface, the refresh interceptor,
//!   and typed commands for platform resources
//!
//! Failures flow up as the [`ApiFailure`] taxonomy; each layer recovers
//! (retry, refresh) or propagates the original typed failure unchanged.

pub mod api;
pub mod config;
pub mod http;

pub use api::{ApiClient, ApiClientBuilder, ApiCommands};
pub use config::{ApiConfig, RuntimeMode};
pub use http::{HttpClient, RequestOptions};

// Re-export the failure taxonomy so call sites need only this crate
pub use fundline_domain::{ApiFailure, FailureKind};
