//! Wire-level constants
//!
//! Centralized location for header names, defaults, and diagnostic
//! allow-lists shared across the client crates.

// Request headers (the CSRF header name is owned by the CsrfTokenProvider)
pub const HEADER_REQUEST_ID: &str = "X-Request-Id";
pub const HEADER_TUNNEL_SKIP_WARNING: &str = "ngrok-skip-browser-warning";

// Expected media type for API responses
pub const EXPECTED_CONTENT_TYPE: &str = "application/json";

// Configuration defaults
pub const DEFAULT_PATH_PREFIX: &str = "/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEV_FALLBACK_BASE_URL: &str = "http://localhost:8787";

// Response diagnostics
pub const BODY_PREVIEW_MAX_CHARS: usize = 500;

/// Response headers echoed back in validation diagnostics. These are the
/// headers that distinguish "the API answered" from "a proxy, tunnel, or the
/// SPA host answered in its place".
pub const DIAGNOSTIC_HEADERS: [&str; 6] = [
    "content-security-policy",
    "x-frame-options",
    "location",
    "server",
    "x-powered-by",
    "access-control-allow-origin",
];

/// Host suffixes that identify a development tunnel in front of the API.
pub const TUNNEL_HOST_SUFFIXES: [&str; 3] = [".ngrok.io", ".ngrok-free.app", ".ngrok.app"];
