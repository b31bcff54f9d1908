//! AHP Module - Room ranking with the Analytic Hierarchy Process.
//!
//! Everything here is synchronous and free of I/O. An [`AhpEngine`] holds the
//! session state (comparison matrices and derived weights); the remaining
//! modules are pure functions and value types it composes.
//!
//! # Components
//!
//! - `criteria` - Static criterion hierarchy (3 main criteria, 10 leaves)
//! - `pairwise_matrix` - Reciprocal Saaty-scale comparison matrices
//! - `solver` - Priority weights, λmax, consistency index and ratio
//! - `score_mapping` - Raw measurements to [0, 1] suitability scores
//! - `aggregation` - WSM / WPM / combined operators, hierarchy, ranking
//! - `preferences` - Pairwise overrides, importance ratings, snapshots
//! - `availability` - Facility filters and availability blending
//! - `engine` - Orchestrates the above into an evaluation pipeline

mod aggregation;
mod availability;
mod criteria;
mod engine;
mod pairwise_matrix;
mod preferences;
mod result;
mod room;
mod score_mapping;
mod solver;

pub use aggregation::{
    aggregate_combined, aggregate_weighted_product, aggregate_weighted_sum,
    aggregate_with_hierarchy, format_ranking, rank_rooms, AggregationMethod, Aggregator,
    HierarchyWeights, DEFAULT_COMBINED_ALPHA, WPM_EPSILON,
};
pub use availability::{blend_availability, FacilityFilter};
pub use criteria::{LeafCriterion, MainCriterion, MAIN_MATRIX_KEY};
pub use engine::{AhpEngine, EngineError, EngineSettings};
pub use pairwise_matrix::{
    check_saaty_value, saaty_label, MatrixValidity, PairwiseMatrix, SAATY_MAX, SAATY_MIN,
    SAATY_SCALE,
};
pub use preferences::{
    ComparisonOverride, ImportanceWeights, PreferenceConfiguration, PreferenceRequest,
    IMPORTANCE_LEVELS,
};
pub use result::{AhpResult, CriterionScore, RawValue, RoomScore};
pub use room::{RoomData, UserRequirements};
pub use score_mapping::{
    map_air_quality, map_av_facilities, map_co2, map_equipment, map_humidity, map_light,
    map_noise, map_occupancy, map_seating_capacity, map_temperature, map_voc, mapping_for,
    MappingConfig, MappingShape, ScoringPolicy, SensorKind, DEFAULT_ROOM_CAPACITY, NEUTRAL_SCORE,
};
pub use solver::{
    format_weights, random_index, ConsistencyRatio, ConsistencyReport, PrioritySolver,
    WeightMethod, CONSISTENCY_THRESHOLD, MAX_MATRIX_SIZE, RANDOM_INDEX,
};
