//! Error types for pool and pipeline operations.

use thiserror::Error;

/// Errors produced by a bounded pool batch.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool was configured with no workers.
    #[error("invalid workers count: {0}")]
    InvalidWorkerCount(usize),
    /// Task failures reached the error budget.
    #[error("errors limit exceeded: {failures} failures, limit {limit}")]
    ErrorsLimitExceeded {
        /// Failures observed when the batch finished.
        failures: usize,
        /// Configured failure threshold.
        limit: usize,
    },
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Internal error (worker thread spawn failure and similar).
    #[error("internal error: {0}")]
    Internal(String),
}

impl PoolError {
    /// Whether this is the error-budget outcome rather than a setup failure.
    #[must_use]
    pub const fn is_limit_exceeded(&self) -> bool {
        matches!(self, Self::ErrorsLimitExceeded { .. })
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON input could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// An environment variable held a value of the wrong shape.
    #[error("environment variable `{key}` has invalid value `{value}`")]
    Env {
        /// Variable name.
        key: String,
        /// Raw value found.
        value: String,
    },
    /// Parsed values failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Application-facing result using anyhow for task bodies and glue code.
pub type AppResult<T> = Result<T, anyhow::Error>;
