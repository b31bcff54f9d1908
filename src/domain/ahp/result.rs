//! Evaluation output types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::aggregation::{format_ranking, AggregationMethod};
use super::criteria::{LeafCriterion, MainCriterion};
use crate::domain::foundation::{EvaluationId, Timestamp};

/// Raw input behind a leaf score, kept for explainability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Flag(bool),
    Count(u32),
    Number(f64),
    Missing,
}

impl RawValue {
    pub fn from_reading(value: Option<f64>) -> Self {
        value.map(RawValue::Number).unwrap_or(RawValue::Missing)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RawValue::Missing)
    }
}

/// One leaf's contribution to a room's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion_id: LeafCriterion,
    pub criterion_name: String,
    pub raw_value: RawValue,
    /// Suitability in [0, 1].
    pub normalized_score: f64,
    /// Global weight applied to this leaf.
    pub weight: f64,
}

impl CriterionScore {
    /// Weighted contribution to the final score under weighted sum.
    pub fn contribution(&self) -> f64 {
        self.normalized_score * self.weight
    }
}

/// Scored and ranked candidate room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomScore {
    pub room_id: String,
    pub room_name: String,
    pub final_score: f64,
    /// 1 is best; tied rooms share a rank.
    pub rank: usize,
    pub comfort_score: f64,
    pub health_score: f64,
    pub usability_score: f64,
    pub criterion_scores: Vec<CriterionScore>,
}

impl RoomScore {
    /// Creates an unranked score with no breakdown.
    pub fn new(room_id: impl Into<String>, room_name: impl Into<String>, final_score: f64) -> Self {
        Self {
            room_id: room_id.into(),
            room_name: room_name.into(),
            final_score,
            rank: 0,
            comfort_score: 0.0,
            health_score: 0.0,
            usability_score: 0.0,
            criterion_scores: Vec::new(),
        }
    }

    /// Returns the aggregated score of one main criterion.
    pub fn main_score(&self, criterion: MainCriterion) -> f64 {
        match criterion {
            MainCriterion::Comfort => self.comfort_score,
            MainCriterion::Health => self.health_score,
            MainCriterion::Usability => self.usability_score,
        }
    }

    /// Returns the breakdown entry for a leaf, if recorded.
    pub fn criterion(&self, leaf: LeafCriterion) -> Option<&CriterionScore> {
        self.criterion_scores.iter().find(|c| c.criterion_id == leaf)
    }
}

/// Outcome of one evaluation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AhpResult {
    pub evaluation_id: EvaluationId,
    /// Rooms ordered best first.
    pub rankings: Vec<RoomScore>,
    pub global_weights: BTreeMap<LeafCriterion, f64>,
    pub main_weights: BTreeMap<MainCriterion, f64>,
    /// Keyed `"main"` and by main-criterion name.
    pub consistency_ratios: BTreeMap<String, f64>,
    /// True only if every consistency ratio is below the threshold.
    pub is_consistent: bool,
    pub method: AggregationMethod,
    pub evaluated_at: Timestamp,
}

impl AhpResult {
    /// Returns the best-ranked room.
    pub fn best(&self) -> Option<&RoomScore> {
        self.rankings.first()
    }

    /// Returns the first `n` rooms.
    pub fn top(&self, n: usize) -> &[RoomScore] {
        &self.rankings[..n.min(self.rankings.len())]
    }

    pub fn find(&self, room_id: &str) -> Option<&RoomScore> {
        self.rankings.iter().find(|r| r.room_id == room_id)
    }

    /// Matrices whose consistency ratio reaches the threshold.
    pub fn inconsistent_matrices(&self, threshold: f64) -> Vec<&str> {
        self.consistency_ratios
            .iter()
            .filter(|(_, cr)| **cr >= threshold)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Text report of the ranking.
    pub fn report(&self, detailed: bool) -> String {
        format_ranking(&self.rankings, detailed)
    }
}
