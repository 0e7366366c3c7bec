//! Error types for Themis rule evaluation.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by rule evaluation and provider setup.
///
/// Unset counters, flags and events are never errors: they read as
/// `0`, `false` and "never recorded" respectively.
#[derive(Error, Debug)]
pub enum RuleError {
    /// A caller-supplied predicate failed while being evaluated
    #[error("Predicate evaluation failed: {0}")]
    Predicate(#[from] anyhow::Error),

    /// The enclosing asynchronous evaluation was cancelled
    #[error("Evaluation cancelled")]
    Cancelled,

    /// The asynchronous evaluation did not finish within its deadline
    #[error("Evaluation timed out after {0:?}")]
    TimedOut(Duration),

    /// Provider configuration could not be loaded
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Snapshot serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl RuleError {
    /// Returns true if this is the cancellation outcome
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RuleError::Cancelled)
    }

    /// Returns the error code string for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            RuleError::Predicate(_) => "PREDICATE_FAILED",
            RuleError::Cancelled => "CANCELLED",
            RuleError::TimedOut(_) => "TIMED_OUT",
            RuleError::ConfigError(_) => "CONFIG_ERROR",
            RuleError::SerializationError(_) => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for RuleError {
    fn from(err: serde_json::Error) -> Self {
        RuleError::SerializationError(err.to_string())
    }
}

/// Result type alias using RuleError
pub type RuleResult<T> = Result<T, RuleError>;
