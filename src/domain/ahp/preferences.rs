//! User preferences - Comparison overrides and importance ratings.
//!
//! Preferences arrive either as explicit pairwise overrides
//! ([`PreferenceRequest`]) or as one Saaty rating per factor
//! ([`ImportanceWeights`]), which is translated into overrides. Every change
//! applied to an engine yields a versioned [`PreferenceConfiguration`]
//! snapshot that can be compared or restored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::criteria::{LeafCriterion, MainCriterion};
use super::pairwise_matrix::{check_saaty_value, PairwiseMatrix, SAATY_MAX, SAATY_MIN};
use crate::domain::foundation::{Timestamp, ValidationError};

/// Floor applied to importance weights before taking ratios.
const MIN_IMPORTANCE: f64 = 0.001;

/// Ratings accepted by [`ImportanceWeights`].
pub const IMPORTANCE_LEVELS: [u8; 5] = [1, 3, 5, 7, 9];

/// One pairwise judgement: `criterion_a` is `value` times as important as
/// `criterion_b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOverride {
    pub criterion_a: String,
    pub criterion_b: String,
    pub value: f64,
}

impl ComparisonOverride {
    pub fn new(criterion_a: impl Into<String>, criterion_b: impl Into<String>, value: f64) -> Self {
        Self {
            criterion_a: criterion_a.into(),
            criterion_b: criterion_b.into(),
            value,
        }
    }

    /// Checks names against a matrix and the value against the Saaty range.
    pub fn validate_against(&self, matrix: &PairwiseMatrix) -> Result<(), ValidationError> {
        matrix.index_of(&self.criterion_a)?;
        matrix.index_of(&self.criterion_b)?;
        check_saaty_value(self.value)?;
        if self.criterion_a == self.criterion_b && self.value != 1.0 {
            return Err(ValidationError::invalid_format(
                "comparison",
                format!(
                    "'{}' compared with itself must be 1, got {}",
                    self.criterion_a, self.value
                ),
            ));
        }
        Ok(())
    }
}

/// Overrides for the main matrix and any sub matrices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRequest {
    #[serde(default)]
    pub main: Vec<ComparisonOverride>,
    #[serde(default)]
    pub sub: BTreeMap<MainCriterion, Vec<ComparisonOverride>>,
}

impl PreferenceRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_main(mut self, a: impl Into<String>, b: impl Into<String>, value: f64) -> Self {
        self.main.push(ComparisonOverride::new(a, b, value));
        self
    }

    pub fn with_sub(
        mut self,
        parent: MainCriterion,
        a: impl Into<String>,
        b: impl Into<String>,
        value: f64,
    ) -> Self {
        self.sub
            .entry(parent)
            .or_default()
            .push(ComparisonOverride::new(a, b, value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.sub.values().all(Vec::is_empty)
    }
}

/// One 1-9 Saaty rating per user-facing factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportanceWeights {
    #[serde(default = "default_importance")]
    pub temperature: u8,
    #[serde(default = "default_importance")]
    pub co2: u8,
    #[serde(default = "default_importance")]
    pub humidity: u8,
    #[serde(default = "default_importance")]
    pub sound: u8,
    #[serde(default = "default_importance")]
    pub facilities: u8,
    #[serde(default = "default_importance")]
    pub availability: u8,
}

fn default_importance() -> u8 {
    1
}

impl Default for ImportanceWeights {
    fn default() -> Self {
        Self {
            temperature: 1,
            co2: 1,
            humidity: 1,
            sound: 1,
            facilities: 1,
            availability: 1,
        }
    }
}

impl ImportanceWeights {
    fn factors(&self) -> [(&'static str, u8); 6] {
        [
            ("temperature", self.temperature),
            ("co2", self.co2),
            ("humidity", self.humidity),
            ("sound", self.sound),
            ("facilities", self.facilities),
            ("availability", self.availability),
        ]
    }

    /// Ensures every rating is one of 1, 3, 5, 7 or 9.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in self.factors() {
            if !IMPORTANCE_LEVELS.contains(&value) {
                return Err(ValidationError::invalid_format(
                    field,
                    format!("must be one of {:?} (Saaty scale), got {}", IMPORTANCE_LEVELS, value),
                ));
            }
        }
        Ok(())
    }

    /// Share of the final score given to calendar availability.
    pub fn availability_share(&self) -> f64 {
        let total: f64 = self.factors().iter().map(|(_, v)| f64::from(*v)).sum();
        if total == 0.0 {
            0.0
        } else {
            f64::from(self.availability) / total
        }
    }

    /// Factor names ordered by rating, highest first.
    pub fn ranked_factors(&self) -> Vec<&'static str> {
        let mut factors = self.factors().to_vec();
        factors.sort_by(|a, b| b.1.cmp(&a.1));
        factors.into_iter().map(|(name, _)| name).collect()
    }

    /// Translates ratings into pairwise overrides for every matrix.
    ///
    /// Main weights: Comfort = temperature + humidity + sound, Health = co2,
    /// Usability = facilities. Leaves without a matching factor use 1.
    /// Each comparison is the ratio of the two weights, clamped to the
    /// Saaty range.
    pub fn to_request(&self) -> Result<PreferenceRequest, ValidationError> {
        self.validate()?;

        let temperature = f64::from(self.temperature);
        let co2 = f64::from(self.co2);
        let humidity = f64::from(self.humidity);
        let sound = f64::from(self.sound);
        let facilities = f64::from(self.facilities);

        let mut main_weights = BTreeMap::new();
        main_weights.insert(MainCriterion::Comfort.as_str(), temperature + humidity + sound);
        main_weights.insert(MainCriterion::Health.as_str(), co2);
        main_weights.insert(MainCriterion::Usability.as_str(), facilities);

        let leaf_weight = |leaf: LeafCriterion| -> f64 {
            match leaf {
                LeafCriterion::Temperature => temperature,
                LeafCriterion::Noise => sound,
                LeafCriterion::Humidity => humidity,
                LeafCriterion::Co2 => co2,
                LeafCriterion::SeatingCapacity
                | LeafCriterion::Equipment
                | LeafCriterion::AvFacilities => facilities,
                LeafCriterion::Lighting | LeafCriterion::AirQuality | LeafCriterion::Voc => 1.0,
            }
        };

        let mut request = PreferenceRequest {
            main: comparisons_from_weights(&MainCriterion::names(), &main_weights),
            sub: BTreeMap::new(),
        };
        for main in MainCriterion::all() {
            let weights: BTreeMap<&str, f64> = main
                .leaves()
                .iter()
                .map(|leaf| (leaf.as_str(), leaf_weight(*leaf)))
                .collect();
            request
                .sub
                .insert(*main, comparisons_from_weights(&main.leaf_names(), &weights));
        }
        Ok(request)
    }
}

/// Upper-triangle comparisons `w_a / w_b`, clamped to [1/9, 9].
fn comparisons_from_weights(criteria: &[&str], weights: &BTreeMap<&str, f64>) -> Vec<ComparisonOverride> {
    let weight = |name: &str| weights.get(name).copied().unwrap_or(1.0).max(MIN_IMPORTANCE);
    let mut comparisons = Vec::new();
    for (i, a) in criteria.iter().enumerate() {
        for b in &criteria[i + 1..] {
            let ratio = (weight(*a) / weight(*b)).clamp(SAATY_MIN, SAATY_MAX);
            comparisons.push(ComparisonOverride::new(*a, *b, ratio));
        }
    }
    comparisons
}

/// Versioned snapshot of an engine's preference state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceConfiguration {
    /// Starts at 0 for the defaults and increments on every change.
    pub version: u64,
    pub main_matrix: PairwiseMatrix,
    pub sub_matrices: BTreeMap<MainCriterion, PairwiseMatrix>,
    pub main_weights: BTreeMap<MainCriterion, f64>,
    pub sub_weights: BTreeMap<MainCriterion, BTreeMap<LeafCriterion, f64>>,
    pub global_weights: BTreeMap<LeafCriterion, f64>,
    pub consistency_ratios: BTreeMap<String, f64>,
    pub is_consistent: bool,
    pub created_at: Timestamp,
}

impl PreferenceConfiguration {
    /// Leaves whose global weight moved by more than `tolerance` between two
    /// snapshots, with (old, new) weights.
    pub fn weight_changes(
        &self,
        other: &PreferenceConfiguration,
        tolerance: f64,
    ) -> BTreeMap<LeafCriterion, (f64, f64)> {
        LeafCriterion::all()
            .iter()
            .filter_map(|leaf| {
                let before = self.global_weights.get(leaf).copied().unwrap_or(0.0);
                let after = other.global_weights.get(leaf).copied().unwrap_or(0.0);
                ((before - after).abs() > tolerance).then_some((*leaf, (before, after)))
            })
            .collect()
    }
}
