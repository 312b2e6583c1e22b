//! Public API surface for the Fundline backend
//!
//! This module layers recovery on top of the single-attempt HTTP executor.
//!
//! # Architecture
//!
//! - [`ApiClient`] exposes the verb methods (get/post/put/patch/delete);
//!   every call runs through bounded exponential-backoff retry, and a 401
//!   surfaced from the retry-wrapped chain triggers one token refresh and
//!   one replay
//! - [`ApiCommands`] is the typed command surface over platform resources
//!   (contributions, subscriptions, milestones, updates, documents)
//! - Auth and CSRF are injected collaborators, never owned here

pub mod client;
pub mod commands;

pub use client::{ApiClient, ApiClientBuilder};
pub use commands::ApiCommands;
