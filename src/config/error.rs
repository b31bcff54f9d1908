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
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("combined_alpha must be between 0 and 1, got {0}")]
    InvalidCombinedAlpha(f64),

    #[error("consistency_threshold must be in (0, 1], got {0}")]
    InvalidConsistencyThreshold(f64),

    #[error("Invalid scoring policy: {0}")]
    InvalidScoringPolicy(String),

    #[error("Candidate file must end in .json, .yaml or .yml: {0}")]
    UnsupportedCandidateFormat(String),

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),
}
