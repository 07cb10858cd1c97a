//! Error taxonomy for the advisory core.
//!
//! HTTP status mapping lives in `api_server::AppError`; these are the
//! transport-agnostic conditions the core components can signal.

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the rate limiter and advisory engine.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Client exhausted its admission window. Recoverable by waiting.
    #[error("too many requests, retry after {} s", retry_after.as_secs())]
    RateLimitExceeded {
        /// Time until the oldest admitted timestamp ages out of the window.
        retry_after: Duration,
    },

    /// An injected model failed during scoring. Surfaced to the caller;
    /// the engine never silently degrades to the rule fallback here.
    #[error("model prediction failed: {0}")]
    PredictionFailed(String),

    /// A field failed schema or range validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl AdvisorError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AdvisorError::InvalidInput(msg.into())
    }
}
