//! Response content-type validation
//!
//! The backend and the static frontend can be misconfigured to collide: API
//! calls silently routed to the SPA's own `index.html`, or a development
//! tunnel injecting an HTML interstitial in front of the real API. A JSON
//! parse failure alone gives no actionable diagnosis, so the validator
//! front-loads detection before any parse is attempted and captures enough
//! of the response to explain what actually answered.

use std::collections::BTreeMap;

use chrono::Utc;
use fundline_domain::constants::{
    BODY_PREVIEW_MAX_CHARS, DIAGNOSTIC_HEADERS, HEADER_TUNNEL_SKIP_WARNING,
};
use fundline_domain::ApiFailure;

/// Everything the validator and error mapping need from a response, captured
/// once so the body is read exactly one time.
#[derive(Debug, Clone)]
pub(crate) struct ResponseSnapshot {
    pub status: u16,
    pub content_type: String,
    /// Allow-listed response headers relevant to diagnosing misrouting
    pub diagnostic_headers: BTreeMap<String, String>,
    pub body: String,
}

impl ResponseSnapshot {
    /// Consume a response into a snapshot.
    ///
    /// Body-read failures yield an empty body rather than an error: the
    /// snapshot exists to diagnose a response, and a half-readable response
    /// is still worth diagnosing.
    pub async fn capture(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let diagnostic_headers = DIAGNOSTIC_HEADERS
            .iter()
            .filter_map(|name| {
                response
                    .headers()
                    .get(*name)
                    .and_then(|value| value.to_str().ok())
                    .map(|value| ((*name).to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await.unwrap_or_default();

        Self { status, content_type, diagnostic_headers, body }
    }
}

/// Check the snapshot's content type against the expected media type.
///
/// Passes only if the content-type header contains the expected substring,
/// so `application/json; charset=utf-8` matches `application/json`. A
/// missing or empty content type fails.
///
/// # Errors
/// Returns `ApiFailure::Validation` carrying the body preview, true body
/// length, diagnostic header snapshot, and a composed message naming the
/// most likely misrouting cause.
pub(crate) fn validate_content_type(
    snapshot: &ResponseSnapshot,
    expected: &str,
    url: &str,
    correlation_id: &str,
) -> Result<(), ApiFailure> {
    if !snapshot.content_type.is_empty() && snapshot.content_type.contains(expected) {
        return Ok(());
    }

    Err(ApiFailure::Validation {
        content_type: snapshot.content_type.clone(),
        expected_content_type: expected.to_string(),
        status: snapshot.status,
        body_preview: snapshot.body.chars().take(BODY_PREVIEW_MAX_CHARS).collect(),
        body_length: snapshot.body.len(),
        headers: snapshot.diagnostic_headers.clone(),
        url: url.to_string(),
        correlation_id: correlation_id.to_string(),
        timestamp: Utc::now(),
        message: diagnose(snapshot, expected, url),
    })
}

/// Compose the human-readable diagnosis for a content-type mismatch.
fn diagnose(snapshot: &ResponseSnapshot, expected: &str, url: &str) -> String {
    let received = if snapshot.content_type.is_empty() {
        "no content type"
    } else {
        snapshot.content_type.as_str()
    };
    let summary = format!(
        "Expected {expected} from {url} but received {received} (HTTP {})",
        snapshot.status
    );

    if snapshot.body.contains("ngrok") {
        return format!(
            "{summary}. The body looks like an ngrok interstitial page; send the \
             {HEADER_TUNNEL_SKIP_WARNING} header (enable tunnel compatibility in the client \
             configuration) so the tunnel forwards requests to the API instead."
        );
    }

    if looks_like_html(snapshot) {
        if snapshot.status == 404 {
            return format!(
                "{summary}. The body is an HTML 404 page, which usually means the API route \
                 fell through to the frontend's index.html; check the server's path mapping \
                 for the API prefix."
            );
        }
        if snapshot.status >= 500 {
            return format!(
                "{summary}. The body is an HTML server error page, so something in front of \
                 the API (proxy, load balancer, host platform) answered instead of the API \
                 itself."
            );
        }
        return format!(
            "{summary}. The body is an HTML document; the request likely never reached the \
             API."
        );
    }

    summary
}

fn looks_like_html(snapshot: &ResponseSnapshot) -> bool {
    let body = snapshot.body.trim_start();
    snapshot.content_type.contains("text/html")
        || body.get(..9).is_some_and(|head| head.eq_ignore_ascii_case("<!doctype"))
        || body.get(..5).is_some_and(|head| head.eq_ignore_ascii_case("<html"))
}
