//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors raised when caller-supplied input violates a domain invariant.
///
/// These are always surfaced synchronously and never corrected silently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Criterion '{criterion}' not found")]
    UnknownCriterion { criterion: String },

    #[error("Criterion '{criterion}' appears more than once")]
    DuplicateCriterion { criterion: String },

    #[error("At least 2 criteria are required for pairwise comparison, got {count}")]
    TooFewCriteria { count: usize },

    #[error("Expected {expected} values, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("Matrix size {size} exceeds maximum supported size of {max}")]
    SizeLimit { size: usize, max: usize },

    #[error("Matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Unknown sensor type '{sensor}'")]
    UnknownSensor { sensor: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an unknown criterion validation error.
    pub fn unknown_criterion(criterion: impl Into<String>) -> Self {
        ValidationError::UnknownCriterion {
            criterion: criterion.into(),
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    OutOfRange,
    UnknownCriterion,

    // Evaluation errors
    NoData,

    // Collaborator errors
    CandidateSourceFailed,
    PublishFailed,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::UnknownCriterion => "UNKNOWN_CRITERION",
            ErrorCode::NoData => "NO_DATA",
            ErrorCode::CandidateSourceFailed => "CANDIDATE_SOURCE_FAILED",
            ErrorCode::PublishFailed => "PUBLISH_FAILED",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let code = match &err {
            ValidationError::OutOfRange { .. } => ErrorCode::OutOfRange,
            ValidationError::UnknownCriterion { .. } => ErrorCode::UnknownCriterion,
            _ => ErrorCode::ValidationFailed,
        };
        DomainError::new(code, err.to_string())
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("comparison", 1.0 / 9.0, 9.0, 12.0);
        assert!(format!("{}", err).starts_with("Field 'comparison' must be between 0.111"));
        assert!(format!("{}", err).ends_with("and 9, got 12"));
    }

    #[test]
    fn validation_error_unknown_criterion_displays_correctly() {
        let err = ValidationError::unknown_criterion("Parking");
        assert_eq!(format!("{}", err), "Criterion 'Parking' not found");
    }

    #[test]
    fn validation_error_size_limit_displays_correctly() {
        let err = ValidationError::SizeLimit { size: 16, max: 15 };
        assert_eq!(
            format!("{}", err),
            "Matrix size 16 exceeds maximum supported size of 15"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::NoData, "No rooms loaded");
        assert_eq!(format!("{}", err), "[NO_DATA] No rooms loaded");
    }

    #[test]
    fn domain_error_from_validation_keeps_category() {
        let err: DomainError = ValidationError::unknown_criterion("Parking").into();
        assert_eq!(err.code, ErrorCode::UnknownCriterion);

        let err: DomainError = ValidationError::WrongLength {
            expected: 3,
            actual: 2,
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::new(ErrorCode::CandidateSourceFailed, "Source unavailable")
            .with_detail("path", "rooms.json");

        assert_eq!(err.details.get("path"), Some(&"rooms.json".to_string()));
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(format!("{}", ErrorCode::NoData), "NO_DATA");
        assert_eq!(format!("{}", ErrorCode::PublishFailed), "PUBLISH_FAILED");
    }
}
