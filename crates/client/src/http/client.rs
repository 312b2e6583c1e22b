//! Single-attempt HTTP execution
//!
//! [`HttpClient`] performs exactly one network attempt per call: header
//! assembly, a fresh correlation id, the hard timeout, content-type
//! validation, and the mapping of every outcome into the failure taxonomy.
//! It never retries and never refreshes tokens; those recoveries are layered
//! on in `crate::api`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fundline_common::auth::{CsrfTokenProvider, TokenProvider};
use fundline_domain::constants::{
    EXPECTED_CONTENT_TYPE, HEADER_REQUEST_ID, HEADER_TUNNEL_SKIP_WARNING, TUNNEL_HOST_SUFFIXES,
};
use fundline_domain::ApiFailure;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::correlation::correlation_id;
use super::validate::{validate_content_type, ResponseSnapshot};
use crate::config::ApiConfig;

/// Per-call request options
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Headers merged over the client defaults; an override wins on collision
    pub headers: BTreeMap<String, String>,
    /// Skip response content-type validation for this call
    pub skip_validation: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a per-call header override.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Disable content-type validation for this call.
    #[must_use]
    pub fn skip_validation(mut self) -> Self {
        self.skip_validation = true;
        self
    }
}

/// Best-effort shape of an API error body
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    errors: Option<HashMap<String, Vec<String>>>,
}

/// HTTP client executing one validated attempt per call
pub struct HttpClient {
    client: reqwest::Client,
    config: ApiConfig,
    tokens: Arc<dyn TokenProvider>,
    csrf: Arc<dyn CsrfTokenProvider>,
    default_headers: BTreeMap<String, String>,
}

impl HttpClient {
    /// Create a new client over the given configuration and collaborators.
    ///
    /// The cookie store is enabled so same-site session cookies ride along
    /// with every request.
    ///
    /// # Errors
    /// Returns `ApiFailure::Config` if the underlying client cannot be built.
    pub fn new(
        config: ApiConfig,
        tokens: Arc<dyn TokenProvider>,
        csrf: Arc<dyn CsrfTokenProvider>,
    ) -> Result<Self, ApiFailure> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiFailure::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config, tokens, csrf, default_headers: BTreeMap::new() })
    }

    /// Replace the default headers sent with every request.
    #[must_use]
    pub fn with_default_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.default_headers = headers;
        self
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Execute a single attempt against an API path.
    ///
    /// The attempt runs under the configured timeout; expiry cancels the
    /// in-flight request. The timer is scoped to this attempt alone, so a
    /// retrying caller gets a fresh one per attempt.
    ///
    /// # Errors
    /// Returns a `Validation`, `Http`, or `Network` failure depending on
    /// where the attempt went wrong.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<T, ApiFailure> {
        let url = self.config.endpoint(path);
        let correlation = correlation_id();
        let timeout = self.config.timeout;

        let request = self.build_request(&method, &url, body, options, &correlation).await;
        debug!(%method, %url, correlation_id = %correlation, "sending request");

        let response = match tokio::time::timeout(timeout, request.send()).await {
            Err(_) => {
                return Err(ApiFailure::Network {
                    message: format!("timeout after {}ms", timeout.as_millis()),
                    correlation_id: correlation,
                    timestamp: Utc::now(),
                });
            }
            Ok(Err(err)) => {
                return Err(ApiFailure::Network {
                    message: format!("network error: {err}"),
                    correlation_id: correlation,
                    timestamp: Utc::now(),
                });
            }
            Ok(Ok(response)) => response,
        };

        let status = response.status();
        debug!(%status, correlation_id = %correlation, "received response");

        // 204 carries no body by contract; there is nothing to validate or
        // parse, so the caller's type is populated from a null payload.
        if status == StatusCode::NO_CONTENT {
            return serde_json::from_value(Value::Null).map_err(|e| ApiFailure::Network {
                message: format!("no-content response cannot populate the requested type: {e}"),
                correlation_id: correlation,
                timestamp: Utc::now(),
            });
        }

        let snapshot = ResponseSnapshot::capture(response).await;

        if !options.skip_validation {
            validate_content_type(&snapshot, EXPECTED_CONTENT_TYPE, &url, &correlation)?;
        }

        if !(200..300).contains(&snapshot.status) {
            return Err(map_error_status(&snapshot, &url, &correlation));
        }

        serde_json::from_str(&snapshot.body).map_err(|e| ApiFailure::Network {
            message: format!("network error: malformed response body: {e}"),
            correlation_id: correlation,
            timestamp: Utc::now(),
        })
    }

    /// Issue a bare GET against an absolute URL and report its status code.
    ///
    /// Used by the health check: no auth, no validation, no retry, just
    /// whether something answers within the given budget.
    ///
    /// # Errors
    /// Returns `ApiFailure::Network` on timeout or transport failure.
    pub(crate) async fn probe(&self, url: &str, timeout: Duration) -> Result<u16, ApiFailure> {
        let correlation = correlation_id();
        let request = self.client.get(url).header(HEADER_REQUEST_ID, &correlation);

        match tokio::time::timeout(timeout, request.send()).await {
            Err(_) => Err(ApiFailure::Network {
                message: format!("timeout after {}ms", timeout.as_millis()),
                correlation_id: correlation,
                timestamp: Utc::now(),
            }),
            Ok(Err(err)) => Err(ApiFailure::Network {
                message: format!("network error: {err}"),
                correlation_id: correlation,
                timestamp: Utc::now(),
            }),
            Ok(Ok(response)) => Ok(response.status().as_u16()),
        }
    }

    async fn build_request(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        options: &RequestOptions,
        correlation_id: &str,
    ) -> reqwest::RequestBuilder {
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "application/json".to_string());
        headers.insert(HEADER_REQUEST_ID.to_string(), correlation_id.to_string());

        if let Some(token) = self.tokens.bearer_token().await {
            headers.insert("Authorization".to_string(), format!("Bearer {token}"));
        }

        if is_mutating(method) {
            if let Some(token) = self.csrf.token().await {
                headers.insert(self.csrf.header_name().to_string(), token);
            }
        }

        for (name, value) in &self.default_headers {
            headers.insert(name.clone(), value.clone());
        }
        for (name, value) in &options.headers {
            headers.insert(name.clone(), value.clone());
        }

        if self.config.tunnel_compat && is_tunnel_host(url) {
            debug!(%url, "tunnel host detected, adding skip-warning header");
            headers.insert(HEADER_TUNNEL_SKIP_WARNING.to_string(), "true".to_string());
        }

        let mut request = self.client.request(method.clone(), url);
        for (name, value) in &headers {
            request = request.header(name, value);
        }

        // Only mutating verbs carry a body
        if let Some(body) = body {
            if matches!(*method, Method::POST | Method::PUT | Method::PATCH) {
                request = request.json(body);
            }
        }

        request
    }
}

fn is_mutating(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH | Method::DELETE)
}

fn is_tunnel_host(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .host_str()
                .map(|host| TUNNEL_HOST_SUFFIXES.iter().any(|suffix| host.ends_with(suffix)))
        })
        .unwrap_or(false)
}

/// Map a non-2xx snapshot into an `Http` failure.
///
/// The message is the first non-empty of: the error body's `message`, its
/// `error`, the raw body text, the canonical status reason, and finally a
/// bare `HTTP <status>`.
fn map_error_status(snapshot: &ResponseSnapshot, url: &str, correlation_id: &str) -> ApiFailure {
    let parsed: ErrorBody = serde_json::from_str(&snapshot.body).unwrap_or_default();

    let message = parsed
        .message
        .filter(|m| !m.trim().is_empty())
        .or(parsed.error.filter(|m| !m.trim().is_empty()))
        .or_else(|| {
            let raw = snapshot.body.trim();
            (!raw.is_empty()).then(|| raw.to_string())
        })
        .or_else(|| {
            StatusCode::from_u16(snapshot.status)
                .ok()
                .and_then(|status| status.canonical_reason())
                .map(String::from)
        })
        .unwrap_or_else(|| format!("HTTP {}", snapshot.status));

    ApiFailure::Http {
        status: snapshot.status,
        message,
        errors: parsed.errors,
        url: url.to_string(),
        correlation_id: correlation_id.to_string(),
        timestamp: Utc::now(),
    }
}
