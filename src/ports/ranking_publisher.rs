//! Ranking Publisher Port - Interface for delivering evaluation results.

use async_trait::async_trait;

use crate::domain::ahp::AhpResult;
use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors that can occur while publishing a ranking
#[derive(Debug, thiserror::Error)]
pub enum RankingPublisherError {
    #[error("Failed to serialize ranking: {0}")]
    SerializationFailed(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),
}

impl From<RankingPublisherError> for DomainError {
    fn from(err: RankingPublisherError) -> Self {
        DomainError::new(ErrorCode::PublishFailed, err.to_string())
    }
}

/// Port for handing finished rankings to downstream consumers
#[async_trait]
pub trait RankingPublisher: Send + Sync {
    /// Publish one evaluation result
    ///
    /// # Errors
    /// Returns `RankingPublisherError` if delivery fails
    async fn publish(&self, result: &AhpResult) -> Result<(), RankingPublisherError>;
}
