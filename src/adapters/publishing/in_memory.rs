//! In-Memory Ranking Publisher
//!
//! Collects published results in memory.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::ahp::AhpResult;
use crate::ports::{RankingPublisher, RankingPublisherError};

/// In-memory ranking publisher
#[derive(Debug, Clone, Default)]
pub struct InMemoryRankingPublisher {
    published: Arc<RwLock<Vec<AhpResult>>>,
}

impl InMemoryRankingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All results published so far, oldest first
    pub async fn published(&self) -> Vec<AhpResult> {
        self.published.read().await.clone()
    }

    /// Most recently published result
    pub async fn latest(&self) -> Option<AhpResult> {
        self.published.read().await.last().cloned()
    }

    pub async fn count(&self) -> usize {
        self.published.read().await.len()
    }

    pub async fn clear(&self) {
        self.published.write().await.clear();
    }
}

#[async_trait]
impl RankingPublisher for InMemoryRankingPublisher {
    async fn publish(&self, result: &AhpResult) -> Result<(), RankingPublisherError> {
        self.published.write().await.push(result.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ahp::{AhpEngine, AggregationMethod, RoomData};

    fn sample_result() -> AhpResult {
        let mut engine = AhpEngine::new();
        engine.load_room_data(vec![RoomData::new("a", "A")]);
        engine.evaluate_rooms(AggregationMethod::WeightedSum).unwrap()
    }

    #[tokio::test]
    async fn keeps_published_results_in_order() {
        let publisher = InMemoryRankingPublisher::new();
        let first = sample_result();
        let second = sample_result();

        publisher.publish(&first).await.unwrap();
        publisher.publish(&second).await.unwrap();

        assert_eq!(publisher.count().await, 2);
        assert_eq!(publisher.published().await[0].evaluation_id, first.evaluation_id);
        assert_eq!(
            publisher.latest().await.map(|r| r.evaluation_id),
            Some(second.evaluation_id)
        );
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let publisher = InMemoryRankingPublisher::new();
        publisher.publish(&sample_result()).await.unwrap();
        publisher.clear().await;
        assert_eq!(publisher.count().await, 0);
        assert!(publisher.latest().await.is_none());
    }
}
