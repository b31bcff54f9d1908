//! Aggregation - Combining leaf scores into final scores and rankings.
//!
//! Three operators are provided over matching score and weight maps:
//! weighted sum (WSM), weighted product (WPM) and a blend of both. Each is
//! invariant to weight scale: weights that do not sum to 1 are renormalized.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::criteria::{LeafCriterion, MainCriterion};
use super::result::RoomScore;
use crate::domain::foundation::ValidationError;

/// Floor applied to scores in the weighted product to avoid `0^w`.
pub const WPM_EPSILON: f64 = 0.001;

/// Default share of the weighted sum in the combined operator.
pub const DEFAULT_COMBINED_ALPHA: f64 = 0.7;

const RANK_RELATIVE_TOLERANCE: f64 = 1e-9;
const RANK_ABSOLUTE_TOLERANCE: f64 = 1e-12;

/// Aggregation operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    #[default]
    WeightedSum,
    WeightedProduct,
    Combined,
}

impl AggregationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::WeightedSum => "weighted_sum",
            AggregationMethod::WeightedProduct => "weighted_product",
            AggregationMethod::Combined => "combined",
        }
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AggregationMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weighted_sum" => Ok(AggregationMethod::WeightedSum),
            "weighted_product" => Ok(AggregationMethod::WeightedProduct),
            "combined" => Ok(AggregationMethod::Combined),
            other => Err(ValidationError::invalid_format(
                "aggregation_method",
                format!("unknown method '{}'", other),
            )),
        }
    }
}

/// Weighted sum `Σ w·s`, divided by `Σw` when the weights do not sum to 1.
///
/// Criteria without a weight count as weight 0.
pub fn aggregate_weighted_sum<K: Ord>(scores: &BTreeMap<K, f64>, weights: &BTreeMap<K, f64>) -> f64 {
    if scores.is_empty() || weights.is_empty() {
        return 0.0;
    }

    let (total, weight_sum) = scores.iter().fold((0.0, 0.0), |(total, sum), (key, score)| {
        let weight = weights.get(key).copied().unwrap_or(0.0);
        (total + weight * score, sum + weight)
    });

    if weight_sum > 0.0 && !is_close(weight_sum, 1.0) {
        total / weight_sum
    } else {
        total
    }
}

/// Weighted product `Π max(ε, s)^w`, raised to `1/Σw` when the weights do
/// not sum to 1.
///
/// Zero-weight criteria are skipped entirely.
pub fn aggregate_weighted_product<K: Ord>(
    scores: &BTreeMap<K, f64>,
    weights: &BTreeMap<K, f64>,
) -> f64 {
    if scores.is_empty() || weights.is_empty() {
        return 0.0;
    }

    let mut product = 1.0;
    let mut weight_sum = 0.0;
    for (key, score) in scores {
        let weight = weights.get(key).copied().unwrap_or(0.0);
        if weight == 0.0 {
            continue;
        }
        product *= score.max(WPM_EPSILON).powf(weight);
        weight_sum += weight;
    }

    if weight_sum > 0.0 && !is_close(weight_sum, 1.0) {
        product.powf(1.0 / weight_sum)
    } else {
        product
    }
}

/// `α·WSM + (1−α)·WPM`.
pub fn aggregate_combined<K: Ord>(
    scores: &BTreeMap<K, f64>,
    weights: &BTreeMap<K, f64>,
    alpha: f64,
) -> f64 {
    alpha * aggregate_weighted_sum(scores, weights)
        + (1.0 - alpha) * aggregate_weighted_product(scores, weights)
}

/// Main and sub weights of the criterion hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyWeights {
    pub main: BTreeMap<MainCriterion, f64>,
    pub sub: BTreeMap<MainCriterion, BTreeMap<LeafCriterion, f64>>,
}

/// Applies one aggregation method with a fixed blend factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregator {
    pub method: AggregationMethod,
    pub combined_alpha: f64,
}

impl Aggregator {
    pub fn new(method: AggregationMethod) -> Self {
        Self {
            method,
            combined_alpha: DEFAULT_COMBINED_ALPHA,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.combined_alpha = alpha;
        self
    }

    pub fn aggregate<K: Ord>(&self, scores: &BTreeMap<K, f64>, weights: &BTreeMap<K, f64>) -> f64 {
        match self.method {
            AggregationMethod::WeightedSum => aggregate_weighted_sum(scores, weights),
            AggregationMethod::WeightedProduct => aggregate_weighted_product(scores, weights),
            AggregationMethod::Combined => aggregate_combined(scores, weights, self.combined_alpha),
        }
    }

    /// Aggregates leaves into main-criterion scores, then those into a final
    /// score.
    ///
    /// # Edge Cases
    /// - Main criteria without sub-weights are skipped, not defaulted
    /// - A leaf with a sub-weight but no score counts as 0.0
    pub fn aggregate_hierarchy(
        &self,
        leaf_scores: &BTreeMap<LeafCriterion, f64>,
        hierarchy: &HierarchyWeights,
    ) -> (f64, BTreeMap<MainCriterion, f64>) {
        let main_scores: BTreeMap<MainCriterion, f64> = MainCriterion::all()
            .iter()
            .filter_map(|main| {
                let sub_weights = hierarchy.sub.get(main)?;
                let sub_scores: BTreeMap<LeafCriterion, f64> = sub_weights
                    .keys()
                    .map(|leaf| (*leaf, leaf_scores.get(leaf).copied().unwrap_or(0.0)))
                    .collect();
                Some((*main, self.aggregate(&sub_scores, sub_weights)))
            })
            .collect();

        let final_score = self.aggregate(&main_scores, &hierarchy.main);
        (final_score, main_scores)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(AggregationMethod::default())
    }
}

/// Hierarchical aggregation with the default blend factor.
pub fn aggregate_with_hierarchy(
    leaf_scores: &BTreeMap<LeafCriterion, f64>,
    hierarchy: &HierarchyWeights,
    method: AggregationMethod,
) -> (f64, BTreeMap<MainCriterion, f64>) {
    Aggregator::new(method).aggregate_hierarchy(leaf_scores, hierarchy)
}

/// Sorts rooms best first and assigns competition ranks.
///
/// The sort is stable, so tied rooms keep their input order. A room whose
/// score approximately equals its predecessor's shares its rank; otherwise
/// its rank is its 1-based position (ranks 1, 1, 3, 4).
pub fn rank_rooms(mut rooms: Vec<RoomScore>) -> Vec<RoomScore> {
    rooms.sort_by(|a, b| sort_key(b.final_score).total_cmp(&sort_key(a.final_score)));

    let mut current_rank = 1;
    for i in 0..rooms.len() {
        if i > 0 && !scores_tie(rooms[i].final_score, rooms[i - 1].final_score) {
            current_rank = i + 1;
        }
        rooms[i].rank = current_rank;
    }
    rooms
}

/// Text report of ranked rooms; main-criterion scores are shown for the
/// top three, or for every room when `detailed`.
pub fn format_ranking(rooms: &[RoomScore], detailed: bool) -> String {
    let rule = "=".repeat(50);
    let mut lines = vec![rule.clone(), "ROOM RANKING RESULTS".to_string(), rule, String::new()];

    for room in rooms {
        lines.push(format!("Rank {}: {}", room.rank, room.room_name));
        lines.push(format!(
            "   Final Score: {:.4} ({:.1}%)",
            room.final_score,
            room.final_score * 100.0
        ));
        if detailed || room.rank <= 3 {
            lines.push(format!("   Comfort:   {:.3}", room.comfort_score));
            lines.push(format!("   Health:    {:.3}", room.health_score));
            lines.push(format!("   Usability: {:.3}", room.usability_score));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn sort_key(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score
    }
}

fn scores_tie(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs());
    (a - b).abs() <= (RANK_RELATIVE_TOLERANCE * scale).max(RANK_ABSOLUTE_TOLERANCE)
}

/// Weight-sum closeness check (rtol 1e-5, atol 1e-8).
fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-8 + 1e-5 * b.abs()
}
