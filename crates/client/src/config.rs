//! Client configuration and endpoint resolution
//!
//! Configuration is read from environment variables once, at construction
//! time, and injected into the client as an immutable value. There is no
//! process-global config: tests and embedders build their own instances.
//!
//! ## Environment Variables
//! - `FUNDLINE_API_BASE_URL`: API base URL; origin-relative values (leading
//!   `/`) are resolved against `FUNDLINE_PUBLIC_ORIGIN`
//! - `FUNDLINE_PUBLIC_ORIGIN`: origin used for origin-relative base URLs
//! - `FUNDLINE_API_PATH_PREFIX`: path prefix (default `/api`)
//! - `FUNDLINE_API_TIMEOUT_MS`: per-request timeout in ms (default 15000)
//! - `FUNDLINE_API_MAX_ATTEMPTS`: retry attempt budget (default 3)
//! - `FUNDLINE_TUNNEL_COMPAT`: send the tunnel skip-warning header (default
//!   off)
//! - `FUNDLINE_RUNTIME_ENV`: `production` or `development` (the default);
//!   production turns a missing base URL into a fatal configuration error

use std::time::Duration;

use fundline_domain::constants::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_PATH_PREFIX, DEFAULT_TIMEOUT_MS, DEV_FALLBACK_BASE_URL,
};
use fundline_domain::ApiFailure;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

/// Runtime mode, controlling how strictly configuration gaps are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Development,
    Production,
}

impl RuntimeMode {
    /// Read the mode from `FUNDLINE_RUNTIME_ENV`; development when unset.
    pub fn from_env() -> Self {
        match std::env::var("FUNDLINE_RUNTIME_ENV").ok().as_deref() {
            Some("production" | "prod") => Self::Production,
            _ => Self::Development,
        }
    }
}

/// Immutable client configuration
///
/// Invariants: `base_url` carries no trailing slash; `path_prefix` is either
/// empty or starts with `/` and carries no trailing slash. The constructors
/// normalize their inputs, so these hold for any instance built through them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub path_prefix: String,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub tunnel_compat: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEV_FALLBACK_BASE_URL.to_string(),
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            tunnel_compat: false,
        }
    }
}

impl ApiConfig {
    /// Create a configuration for the given base URL with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: strip_trailing_slashes(&base_url.into()), ..Self::default() }
    }

    /// Replace the path prefix (normalized: leading slash, no trailing).
    #[must_use]
    pub fn with_path_prefix(mut self, prefix: &str) -> Self {
        self.path_prefix = normalize_prefix(prefix);
        self
    }

    /// Replace the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the attempt budget.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Toggle the tunnel compatibility header.
    #[must_use]
    pub fn with_tunnel_compat(mut self, enabled: bool) -> Self {
        self.tunnel_compat = enabled;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns `ApiFailure::Config` if a required variable is missing for the
    /// current runtime mode or a value cannot be parsed.
    pub fn from_env() -> Result<Self, ApiFailure> {
        Self::from_env_with_mode(RuntimeMode::from_env())
    }

    /// Load configuration from environment variables under an explicit mode.
    ///
    /// # Errors
    /// See [`ApiConfig::from_env`].
    pub fn from_env_with_mode(mode: RuntimeMode) -> Result<Self, ApiFailure> {
        let base_url = resolve_base_url(
            std::env::var("FUNDLINE_API_BASE_URL").ok(),
            std::env::var("FUNDLINE_PUBLIC_ORIGIN").ok(),
            mode,
        )?;
        let path_prefix = normalize_prefix(
            &std::env::var("FUNDLINE_API_PATH_PREFIX")
                .unwrap_or_else(|_| DEFAULT_PATH_PREFIX.to_string()),
        );
        let timeout_ms = env_u64("FUNDLINE_API_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;
        let max_attempts = env_u32("FUNDLINE_API_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        let tunnel_compat = env_bool("FUNDLINE_TUNNEL_COMPAT", false);

        info!(base_url = %base_url, path_prefix = %path_prefix, "API configuration loaded");

        Ok(Self {
            base_url,
            path_prefix,
            timeout: Duration::from_millis(timeout_ms),
            max_attempts,
            tunnel_compat,
        })
    }

    /// Build the full request URL for an API path.
    ///
    /// The path is normalized to a single leading slash. A path that already
    /// carries the configured prefix is not prefixed again, so callers may
    /// pass either `/contributions/1` or `/api/contributions/1`.
    pub fn endpoint(&self, path: &str) -> String {
        let path = normalize_path(path);
        if self.has_prefix(&path) {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}{}", self.base_url, self.path_prefix, path)
        }
    }

    fn has_prefix(&self, normalized_path: &str) -> bool {
        if self.path_prefix.is_empty() {
            return true;
        }
        normalized_path == self.path_prefix
            || normalized_path
                .strip_prefix(self.path_prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'))
    }
}

fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim().trim_start_matches('/'))
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed == "/" {
        return String::new();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn strip_trailing_slashes(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Resolve the configured base URL value against the runtime mode.
///
/// Missing values are fatal in production and fall back to the local
/// development API otherwise. Origin-relative values are resolved against
/// the configured public origin.
fn resolve_base_url(
    raw: Option<String>,
    origin: Option<String>,
    mode: RuntimeMode,
) -> Result<String, ApiFailure> {
    let raw = raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    let value = match raw {
        None => match mode {
            RuntimeMode::Production => {
                return Err(ApiFailure::config(
                    "FUNDLINE_API_BASE_URL must be set in production",
                ));
            }
            RuntimeMode::Development => {
                debug!(fallback = DEV_FALLBACK_BASE_URL, "base URL not set, using dev fallback");
                DEV_FALLBACK_BASE_URL.to_string()
            }
        },
        Some(path) if path.starts_with('/') => {
            let origin = match origin.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
                Some(origin) => origin,
                None => match mode {
                    RuntimeMode::Production => {
                        return Err(ApiFailure::config(
                            "FUNDLINE_PUBLIC_ORIGIN must be set to resolve an \
                             origin-relative base URL in production",
                        ));
                    }
                    RuntimeMode::Development => DEV_FALLBACK_BASE_URL.to_string(),
                },
            };
            let origin_url = Url::parse(&origin).map_err(|e| {
                ApiFailure::config(format!("Invalid public origin '{origin}': {e}"))
            })?;
            origin_url
                .join(&path)
                .map_err(|e| {
                    ApiFailure::config(format!("Invalid origin-relative base URL '{path}': {e}"))
                })?
                .to_string()
        }
        Some(url) => {
            Url::parse(&url)
                .map_err(|e| ApiFailure::config(format!("Invalid base URL '{url}': {e}")))?;
            url
        }
    };

    Ok(strip_trailing_slashes(&value))
}

/// Parse a u64 from an environment variable, with a default when unset.
fn env_u64(key: &str, default: u64) -> Result<u64, ApiFailure> {
    match std::env::var(key) {
        Ok(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|e| ApiFailure::config(format!("Invalid {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse a u32 from an environment variable, with a default when unset.
fn env_u32(key: &str, default: u32) -> Result<u32, ApiFailure> {
    match std::env::var(key) {
        Ok(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|e| ApiFailure::config(format!("Invalid {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
