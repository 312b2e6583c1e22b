//! Per-attempt correlation ids
//!
//! Every attempt gets its own id, attached as a request header and echoed in
//! failure diagnostics, so one logical call retried three times is traceable
//! as three distinct requests on the server side.

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

const SUFFIX_LEN: usize = 8;

/// Generate a correlation id of the form `req_<millis>_<suffix>`.
pub(crate) fn correlation_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("req_{}_{}", Utc::now().timestamp_millis(), suffix)
}
