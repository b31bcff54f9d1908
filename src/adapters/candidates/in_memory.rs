//! In-Memory Candidate Source Adapter
//!
//! Serves a room list held in memory. Useful for testing and development.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::ahp::RoomData;
use crate::ports::{CandidateSource, CandidateSourceError};

/// In-memory candidate source
#[derive(Debug, Clone, Default)]
pub struct InMemoryCandidateSource {
    rooms: Arc<RwLock<Vec<RoomData>>>,
}

impl InMemoryCandidateSource {
    pub fn new(rooms: Vec<RoomData>) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(rooms)),
        }
    }

    /// Replace the served rooms
    pub async fn replace(&self, rooms: Vec<RoomData>) {
        *self.rooms.write().await = rooms;
    }

    /// Update one room's availability flag; returns false if the room is unknown
    pub async fn set_available(&self, room_id: &str, available: bool) -> bool {
        let mut rooms = self.rooms.write().await;
        match rooms.iter_mut().find(|r| r.room_id == room_id) {
            Some(room) => {
                room.is_available = available;
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }
}

#[async_trait]
impl CandidateSource for InMemoryCandidateSource {
    async fn fetch_candidates(&self) -> Result<Vec<RoomData>, CandidateSourceError> {
        Ok(self.rooms.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_configured_rooms() {
        let source = InMemoryCandidateSource::new(vec![RoomData::new("a", "A")]);
        let rooms = source.fetch_candidates().await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].room_id, "a");
    }

    #[tokio::test]
    async fn replace_swaps_snapshot() {
        let source = InMemoryCandidateSource::default();
        assert!(source.is_empty().await);
        source
            .replace(vec![RoomData::new("a", "A"), RoomData::new("b", "B")])
            .await;
        assert_eq!(source.len().await, 2);
    }

    #[tokio::test]
    async fn set_available_updates_known_room() {
        let source = InMemoryCandidateSource::new(vec![RoomData::new("a", "A")]);
        assert!(source.set_available("a", false).await);
        assert!(!source.set_available("zzz", false).await);
        let rooms = source.fetch_candidates().await.unwrap();
        assert!(!rooms[0].is_available);
    }
}
