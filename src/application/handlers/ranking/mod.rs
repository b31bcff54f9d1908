//! Ranking handlers.

mod rank_rooms;

pub use rank_rooms::{RankRoomsCommand, RankRoomsHandler};
