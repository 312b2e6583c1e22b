//! Failure taxonomy for Fundline API calls
//!
//! A single tagged union covers every way a call can fail. Layers above
//! match on it exhaustively; nothing downcasts. The union is serializable so
//! diagnostics survive logging and IPC boundaries intact.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discriminant of [`ApiFailure`], matching the serialized `kind` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Wrong content type: a configuration/routing problem, never retried
    Validation,
    /// Non-2xx status from the API (4xx caller problem, 5xx server problem)
    Http,
    /// Timeout or transport-level failure
    Network,
    /// Construction-time misconfiguration
    Config,
}

/// Main failure type for Fundline API operations
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiFailure {
    /// The response body is not what the API contract promises (e.g. an HTML
    /// page where JSON was expected). Carries everything needed to diagnose
    /// the misrouting without re-issuing the request.
    #[error("{message}")]
    Validation {
        content_type: String,
        expected_content_type: String,
        status: u16,
        body_preview: String,
        body_length: usize,
        headers: BTreeMap<String, String>,
        url: String,
        correlation_id: String,
        timestamp: DateTime<Utc>,
        message: String,
    },

    /// The API answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        /// Field-level validation errors from the API error body, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        errors: Option<HashMap<String, Vec<String>>>,
        url: String,
        correlation_id: String,
        timestamp: DateTime<Utc>,
    },

    /// The request never produced an HTTP response (timeout, DNS failure,
    /// refused connection, dropped socket).
    #[error("{message}")]
    Network { message: String, correlation_id: String, timestamp: DateTime<Utc> },

    /// The client was built from invalid configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias for Fundline client operations
pub type Result<T> = std::result::Result<T, ApiFailure>;

impl ApiFailure {
    /// Convenience constructor for configuration failures.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// The discriminant of this failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validation { .. } => FailureKind::Validation,
            Self::Http { .. } => FailureKind::Http,
            Self::Network { .. } => FailureKind::Network,
            Self::Config { .. } => FailureKind::Config,
        }
    }

    /// HTTP status associated with this failure, when one exists.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Validation { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::Network { .. } | Self::Config { .. } => None,
        }
    }

    /// Whether retrying the call could plausibly succeed.
    ///
    /// Only network failures and 5xx responses are transient. A content-type
    /// mismatch will not heal by retrying, and 4xx means the request itself
    /// is wrong.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            Self::Validation { .. } | Self::Config { .. } => false,
        }
    }

    /// Whether this failure is an expired/invalid access token (HTTP 401),
    /// the one case the client answers with a token refresh and replay.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. })
    }

    /// Correlation id of the attempt that produced this failure, if the
    /// failure got far enough to have one.
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            Self::Validation { correlation_id, .. }
            | Self::Http { correlation_id, .. }
            | Self::Network { correlation_id, .. } => Some(correlation_id),
            Self::Config { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_failure(status: u16) -> ApiFailure {
        ApiFailure::Http {
            status,
            message: "test".to_string(),
            errors: None,
            url: "https://api.fundline.org/api/x".to_string(),
            correlation_id: "req_0_test".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_failure_kinds() {
        assert_eq!(http_failure(500).kind(), FailureKind::Http);
        assert_eq!(ApiFailure::config("nope").kind(), FailureKind::Config);

        let network = ApiFailure::Network {
            message: "network error: connection refused".to_string(),
            correlation_id: "req_0_test".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(network.kind(), FailureKind::Network);
    }

    #[test]
    fn test_transient_classification() {
        assert!(http_failure(500).is_transient());
        assert!(http_failure(503).is_transient());
        assert!(!http_failure(400).is_transient());
        assert!(!http_failure(404).is_transient());
        assert!(!http_failure(499).is_transient());
        assert!(!ApiFailure::config("nope").is_transient());

        let network = ApiFailure::Network {
            message: "timeout after 100ms".to_string(),
            correlation_id: "req_0_test".to_string(),
            timestamp: Utc::now(),
        };
        assert!(network.is_transient());
    }

    #[test]
    fn test_auth_expired_is_401_only() {
        assert!(http_failure(401).is_auth_expired());
        assert!(!http_failure(403).is_auth_expired());
        assert!(!http_failure(500).is_auth_expired());
    }

    #[test]
    fn test_status_extraction() {
        assert_eq!(http_failure(422).status(), Some(422));
        assert_eq!(ApiFailure::config("nope").status(), None);
    }

    #[test]
    fn test_serialized_kind_tag() {
        let value = serde_json::to_value(http_failure(404)).expect("serializable");
        assert_eq!(value["kind"], "http");
        assert_eq!(value["status"], 404);

        let value = serde_json::to_value(ApiFailure::config("missing base url"))
            .expect("serializable");
        assert_eq!(value["kind"], "config");
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(http_failure(500).to_string(), "HTTP 500: test");
        assert_eq!(
            ApiFailure::config("missing base url").to_string(),
            "Configuration error: missing base url"
        );
    }
}
