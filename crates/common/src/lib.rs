//! # Fundline Common
//!
//! Reusable, domain-agnostic building blocks for the Fundline client SDK:
//!
//! - `resilience`: generic retry execution with pluggable policies and
//!   backoff strategies
//! - `auth`: collaborator contracts for token and CSRF providers, plus
//!   simple built-in implementations
//!
//! This crate knows nothing about HTTP or the Fundline API; the client crate
//! wires these primitives to its own failure taxonomy.

pub mod auth;
pub mod resilience;
