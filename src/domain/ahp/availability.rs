//! Hard facility filters and calendar-availability blending.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::aggregation::rank_rooms;
use super::result::RoomScore;
use super::room::{RoomData, UserRequirements};

/// Facility constraints a room must satisfy to be ranked at all.
///
/// Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityFilter {
    #[serde(default)]
    pub videoprojector: Option<bool>,
    #[serde(default)]
    pub min_seating: Option<u32>,
    /// Whether the room must (or must not) have computers.
    #[serde(default)]
    pub computers: Option<bool>,
    #[serde(default)]
    pub min_training_robots: Option<u32>,
}

impl FacilityFilter {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches(&self, room: &RoomData) -> bool {
        if let Some(projector) = self.videoprojector {
            if room.has_projector != projector {
                return false;
            }
        }
        if let Some(min) = self.min_seating {
            if room.seating_capacity < min {
                return false;
            }
        }
        if let Some(computers) = self.computers {
            if (room.computers > 0) != computers {
                return false;
            }
        }
        if let Some(min) = self.min_training_robots {
            if room.training_robots < min {
                return false;
            }
        }
        true
    }

    /// Keeps only the rooms satisfying every constraint.
    pub fn apply(&self, rooms: Vec<RoomData>) -> Vec<RoomData> {
        rooms.into_iter().filter(|room| self.matches(room)).collect()
    }

    /// Scoring requirements implied by the filter.
    pub fn to_requirements(&self) -> UserRequirements {
        UserRequirements::new(
            self.min_seating.unwrap_or(0),
            self.videoprojector.unwrap_or(false),
            u32::from(self.computers.unwrap_or(false)),
        )
    }
}

/// Mixes calendar availability into final scores and re-ranks.
///
/// `final' = final·(1 − share) + a·share` where `a` is 1 for an available
/// room and 0 otherwise. Rooms missing from `rooms` count as available.
pub fn blend_availability(rankings: Vec<RoomScore>, rooms: &[RoomData], share: f64) -> Vec<RoomScore> {
    let share = share.clamp(0.0, 1.0);
    if share == 0.0 {
        return rankings;
    }

    let available: HashMap<&str, bool> = rooms
        .iter()
        .map(|room| (room.room_id.as_str(), room.is_available))
        .collect();

    let blended = rankings
        .into_iter()
        .map(|mut room| {
            let is_available = available.get(room.room_id.as_str()).copied().unwrap_or(true);
            let availability = if is_available { 1.0 } else { 0.0 };
            room.final_score = room.final_score * (1.0 - share) + availability * share;
            room
        })
        .collect();

    rank_rooms(blended)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str, seats: u32, projector: bool, computers: u32, robots: u32) -> RoomData {
        RoomData {
            seating_capacity: seats,
            has_projector: projector,
            computers,
            training_robots: robots,
            has_robots: robots > 0,
            ..RoomData::new(id, id)
        }
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let filter = FacilityFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(vec![room("a", 0, false, 0, 0)]).len(), 1);
    }

    #[test]
    fn filter_applies_every_constraint() {
        let filter = FacilityFilter {
            videoprojector: Some(true),
            min_seating: Some(20),
            computers: Some(true),
            min_training_robots: Some(2),
        };
        assert!(filter.matches(&room("ok", 30, true, 10, 2)));
        assert!(!filter.matches(&room("no-projector", 30, false, 10, 2)));
        assert!(!filter.matches(&room("small", 10, true, 10, 2)));
        assert!(!filter.matches(&room("no-pc", 30, true, 0, 2)));
        assert!(!filter.matches(&room("few-robots", 30, true, 10, 1)));
    }

    #[test]
    fn filter_can_exclude_computers() {
        let filter = FacilityFilter {
            computers: Some(false),
            ..FacilityFilter::default()
        };
        assert!(filter.matches(&room("a", 10, false, 0, 0)));
        assert!(!filter.matches(&room("b", 10, false, 4, 0)));
    }

    #[test]
    fn filter_implies_requirements() {
        let filter = FacilityFilter {
            videoprojector: Some(true),
            min_seating: Some(25),
            computers: Some(true),
            min_training_robots: None,
        };
        assert_eq!(filter.to_requirements(), UserRequirements::new(25, true, 1));
    }

    #[test]
    fn unavailable_rooms_drop_in_ranking() {
        let rankings = rank_rooms(vec![RoomScore::new("a", "A", 0.9), RoomScore::new("b", "B", 0.7)]);
        let mut busy = RoomData::new("a", "A");
        busy.is_available = false;
        let rooms = vec![busy, RoomData::new("b", "B")];

        let blended = blend_availability(rankings, &rooms, 0.5);
        assert_eq!(blended[0].room_id, "b");
        assert!((blended[0].final_score - 0.85).abs() < 1e-12);
        assert!((blended[1].final_score - 0.45).abs() < 1e-12);
        assert_eq!(blended[1].rank, 2);
    }

    #[test]
    fn zero_share_leaves_scores_untouched() {
        let rankings = rank_rooms(vec![RoomScore::new("a", "A", 0.9)]);
        let blended = blend_availability(rankings.clone(), &[], 0.0);
        assert_eq!(blended, rankings);
    }
}
