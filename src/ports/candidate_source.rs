//! Candidate Source Port - Interface for loading candidate rooms.
//!
//! Room and sensor records live outside the ranking core. A candidate
//! source materializes one snapshot of them per evaluation.

use async_trait::async_trait;

use crate::domain::ahp::RoomData;
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors that can occur while fetching candidates
#[derive(Debug, thiserror::Error)]
pub enum CandidateSourceError {
    #[error("Candidate source not found: {0}")]
    NotFound(String),

    #[error("Unsupported candidate format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to parse candidates: {0}")]
    ParseFailed(String),

    #[error("Invalid candidate record: {0}")]
    InvalidRecord(#[from] ValidationError),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<CandidateSourceError> for DomainError {
    fn from(err: CandidateSourceError) -> Self {
        DomainError::new(ErrorCode::CandidateSourceFailed, err.to_string())
    }
}

/// Port for fetching the rooms to rank
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Fetch the current snapshot of candidate rooms
    ///
    /// # Errors
    /// Returns `CandidateSourceError` if the snapshot cannot be produced
    async fn fetch_candidates(&self) -> Result<Vec<RoomData>, CandidateSourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_maps_to_candidate_source_failed() {
        let err: DomainError = CandidateSourceError::NotFound("rooms.json".to_string()).into();
        assert_eq!(err.code, ErrorCode::CandidateSourceFailed);
        assert!(err.message.contains("rooms.json"));
    }

    #[test]
    fn validation_errors_convert() {
        let err: CandidateSourceError = ValidationError::empty_field("id").into();
        assert!(matches!(err, CandidateSourceError::InvalidRecord(_)));
    }
}
