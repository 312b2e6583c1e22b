//! Resilience primitives
//!
//! Currently retry execution with configurable backoff. Policies decide
//! *whether* to retry; strategies decide *how long* to wait.

pub mod retry;

pub use retry::{
    policies, BackoffStrategy, RetryConfig, RetryConfigBuilder, RetryConfigError, RetryDecision,
    RetryExecutor, RetryPolicy,
};
