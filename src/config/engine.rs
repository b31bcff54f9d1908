//! Engine configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::ahp::{
    AggregationMethod, EngineSettings, ScoringPolicy, WeightMethod, CONSISTENCY_THRESHOLD,
    DEFAULT_COMBINED_ALPHA,
};

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// How priority weights are derived from comparison matrices
    #[serde(default)]
    pub weight_method: WeightMethod,

    /// How leaf scores are combined into a room score
    #[serde(default)]
    pub aggregation_method: AggregationMethod,

    /// Weighted-sum share for the combined method
    #[serde(default = "default_combined_alpha")]
    pub combined_alpha: f64,

    /// Consistency ratios at or above this are flagged
    #[serde(default = "default_consistency_threshold")]
    pub consistency_threshold: f64,
}

impl EngineConfig {
    /// Build engine settings with the given scoring policy
    pub fn to_settings(&self, scoring: ScoringPolicy) -> EngineSettings {
        EngineSettings {
            weight_method: self.weight_method,
            combined_alpha: self.combined_alpha,
            consistency_threshold: self.consistency_threshold,
            scoring,
        }
    }

    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.combined_alpha) {
            return Err(ValidationError::InvalidCombinedAlpha(self.combined_alpha));
        }
        if !(self.consistency_threshold > 0.0 && self.consistency_threshold <= 1.0) {
            return Err(ValidationError::InvalidConsistencyThreshold(
                self.consistency_threshold,
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weight_method: WeightMethod::default(),
            aggregation_method: AggregationMethod::default(),
            combined_alpha: default_combined_alpha(),
            consistency_threshold: default_consistency_threshold(),
        }
    }
}

fn default_combined_alpha() -> f64 {
    DEFAULT_COMBINED_ALPHA
}

fn default_consistency_threshold() -> f64 {
    CONSISTENCY_THRESHOLD
}
