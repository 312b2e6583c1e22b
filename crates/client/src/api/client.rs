//! API client with retry and auth refresh
//!
//! [`ApiClient`] is the composition point of the layered design: each verb
//! call runs the single-attempt executor under the retry coordinator, and a
//! 401 surfaced from that chain triggers exactly one token refresh and one
//! replay. A second 401 after the replay is returned as-is; a failed refresh
//! propagates the original 401 so the caller sees the real cause.

use std::sync::Arc;
use std::time::Duration;

use fundline_common::auth::{CsrfTokenProvider, NoAuth, NoCsrf, TokenProvider};
use fundline_common::resilience::{
    RetryConfig, RetryDecision, RetryExecutor, RetryPolicy,
};
use fundline_domain::ApiFailure;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::ApiConfig;
use crate::http::{HttpClient, RequestOptions};

/// Budget for the health probe, deliberately shorter than request timeouts
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Retry transient failures only: network errors and 5xx responses.
///
/// Validation failures and 4xx responses will not heal by retrying, so the
/// policy stops on them immediately.
struct TransientFailurePolicy;

impl RetryPolicy<ApiFailure> for TransientFailurePolicy {
    fn should_retry(&self, error: &ApiFailure, _attempt: u32) -> RetryDecision {
        if error.is_transient() {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    }
}

/// Resilient client for the Fundline REST API
pub struct ApiClient {
    http: Arc<HttpClient>,
    tokens: Arc<dyn TokenProvider>,
    retry: RetryExecutor<TransientFailurePolicy>,
}

impl ApiClient {
    /// Create a client with the standard backoff schedule (1s, 2s, 4s, ...).
    ///
    /// # Errors
    /// Returns `ApiFailure::Config` if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(
        config: ApiConfig,
        tokens: Arc<dyn TokenProvider>,
        csrf: Arc<dyn CsrfTokenProvider>,
    ) -> Result<Self, ApiFailure> {
        let retry_config = RetryConfig::builder()
            .max_attempts(config.max_attempts)
            .exponential_backoff(Duration::from_secs(1), 2.0, Duration::from_secs(30))
            .build()
            .map_err(|e| ApiFailure::config(e.to_string()))?;

        Self::with_retry_config(config, tokens, csrf, retry_config)
    }

    fn with_retry_config(
        config: ApiConfig,
        tokens: Arc<dyn TokenProvider>,
        csrf: Arc<dyn CsrfTokenProvider>,
        retry_config: RetryConfig,
    ) -> Result<Self, ApiFailure> {
        let http = HttpClient::new(config, Arc::clone(&tokens), csrf)?;

        Ok(Self {
            http: Arc::new(http),
            tokens,
            retry: RetryExecutor::new(retry_config, TransientFailurePolicy),
        })
    }

    /// Create a builder for fluent configuration.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Execute a GET request.
    ///
    /// # Errors
    /// Returns the failure of the final attempt made.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiFailure> {
        self.run(Method::GET, path, None, RequestOptions::default()).await
    }

    /// Execute a GET request with per-call options.
    ///
    /// # Errors
    /// Returns the failure of the final attempt made.
    #[instrument(skip(self, options), fields(path = %path))]
    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiFailure> {
        self.run(Method::GET, path, None, options).await
    }

    /// Execute a POST request with a JSON body.
    ///
    /// # Errors
    /// Returns the failure of the final attempt made.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiFailure> {
        self.run(Method::POST, path, Some(to_body(body)?), RequestOptions::default()).await
    }

    /// Execute a POST request with a JSON body and per-call options.
    ///
    /// # Errors
    /// Returns the failure of the final attempt made.
    #[instrument(skip(self, body, options), fields(path = %path))]
    pub async fn post_with<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiFailure> {
        self.run(Method::POST, path, Some(to_body(body)?), options).await
    }

    /// Execute a PUT request with a JSON body.
    ///
    /// # Errors
    /// Returns the failure of the final attempt made.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiFailure> {
        self.run(Method::PUT, path, Some(to_body(body)?), RequestOptions::default()).await
    }

    /// Execute a PATCH request with a JSON body.
    ///
    /// # Errors
    /// Returns the failure of the final attempt made.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiFailure> {
        self.run(Method::PATCH, path, Some(to_body(body)?), RequestOptions::default()).await
    }

    /// Execute a DELETE request.
    ///
    /// A 204 response resolves with a null payload, so `()` and `Option<T>`
    /// are the usual target types.
    ///
    /// # Errors
    /// Returns the failure of the final attempt made.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiFailure> {
        self.run(Method::DELETE, path, None, RequestOptions::default()).await
    }

    /// Probe the API health endpoint.
    ///
    /// Never retried, never authenticated, and bounded by a short fixed
    /// timeout. A reachable but unhealthy API is `Ok(false)`, not an error.
    ///
    /// # Errors
    /// Returns `ApiFailure::Network` if nothing answers within the budget.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<bool, ApiFailure> {
        let url = format!("{}/health", self.http.config().base_url);
        debug!(%url, "health check");

        match self.http.probe(&url, HEALTH_CHECK_TIMEOUT).await {
            Ok(status) if (200..300).contains(&status) => {
                info!("API is healthy");
                Ok(true)
            }
            Ok(status) => {
                warn!(status, "health endpoint returned non-success");
                Ok(false)
            }
            Err(err) => {
                warn!(error = %err, "health check failed");
                Err(err)
            }
        }
    }

    /// The interceptor: retry-wrapped chain first, then at most one
    /// refresh-and-replay cycle on a 401.
    async fn run<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<T, ApiFailure> {
        let original = match self.attempt_with_retry(&method, path, body.as_ref(), &options).await
        {
            Ok(value) => return Ok(value),
            Err(err) if err.is_auth_expired() => err,
            Err(err) => return Err(err),
        };

        debug!(path, "access token rejected, refreshing");
        match self.tokens.refresh().await {
            Ok(()) => {
                // Exactly one replay, not a fresh retry budget. A second 401
                // comes back unchanged with no second refresh.
                debug!(path, "token refreshed, replaying request once");
                self.http.execute(method, path, body.as_ref(), &options).await
            }
            Err(refresh_err) => {
                warn!(path, error = %refresh_err, "token refresh failed, returning original 401");
                Err(original)
            }
        }
    }

    async fn attempt_with_retry<T: DeserializeOwned>(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<T, ApiFailure> {
        let http = Arc::clone(&self.http);

        self.retry
            .execute(|| {
                let http = Arc::clone(&http);
                let method = method.clone();
                let path = path.to_string();
                let body = body.cloned();
                let options = options.clone();
                async move { http.execute(method, &path, body.as_ref(), &options).await }
            })
            .await
    }
}

fn to_body<B: Serialize>(body: &B) -> Result<Value, ApiFailure> {
    serde_json::to_value(body)
        .map_err(|e| ApiFailure::config(format!("Failed to serialize request body: {e}")))
}

/// Builder for [`ApiClient`]
///
/// Defaults to anonymous access with no CSRF protection, which fits the
/// public content endpoints; authenticated surfaces inject their providers.
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiConfig>,
    tokens: Option<Arc<dyn TokenProvider>>,
    csrf: Option<Arc<dyn CsrfTokenProvider>>,
    retry_config: Option<RetryConfig>,
}

impl ApiClientBuilder {
    /// Set the client configuration.
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the bearer token collaborator.
    #[must_use]
    pub fn token_provider(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Set the CSRF token collaborator.
    #[must_use]
    pub fn csrf_provider(mut self, csrf: Arc<dyn CsrfTokenProvider>) -> Self {
        self.csrf = Some(csrf);
        self
    }

    /// Override the retry configuration (attempt budget and backoff).
    ///
    /// Tests use this to inject millisecond-scale backoff; production code
    /// normally keeps the standard schedule derived from [`ApiConfig`].
    #[must_use]
    pub fn retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = Some(retry_config);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Returns `ApiFailure::Config` if construction fails.
    pub fn build(self) -> Result<ApiClient, ApiFailure> {
        let config = self.config.unwrap_or_default();
        let tokens = self.tokens.unwrap_or_else(|| Arc::new(NoAuth));
        let csrf = self.csrf.unwrap_or_else(|| Arc::new(NoCsrf));

        match self.retry_config {
            Some(retry_config) => {
                ApiClient::with_retry_config(config, tokens, csrf, retry_config)
            }
            None => ApiClient::new(config, tokens, csrf),
        }
    }
}
