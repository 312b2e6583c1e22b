//! HTTP request execution
//!
//! This module performs exactly one network attempt per call: header
//! assembly, correlation ids, the hard timeout, content-type validation, and
//! the mapping of every outcome into the failure taxonomy. Retry and auth
//! recovery are layered on top in `crate::api`.

pub mod client;
pub(crate) mod correlation;
pub(crate) mod validate;

pub use client::{HttpClient, RequestOptions};
