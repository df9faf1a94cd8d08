//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("{field} must be greater than zero")]
    MustBePositive { field: &'static str },

    #[error("{field} must be within [0, 1], got {value}")]
    NotAFraction { field: &'static str, value: f32 },

    #[error("Invalid VAD configuration: {0}")]
    InvalidVad(String),

    #[error("Pause band edges must be strictly increasing")]
    PauseBandsNotIncreasing,

    #[error("Expiring window must be shorter than the max session duration")]
    ExpiringWindowTooLong,

    #[error("History must hold at least one user/assistant exchange")]
    HistoryTooShort,
}
