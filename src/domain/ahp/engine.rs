//! AhpEngine - Session state and the evaluation pipeline.
//!
//! The engine owns one comparison matrix for the main criteria and one per
//! main criterion's leaves. Weights and consistency ratios are derived from
//! those matrices whenever they change; global leaf weights are the product
//! of main and sub weights.
//!
//! Evaluation maps each room's raw attributes to leaf scores, aggregates them
//! through the hierarchy and ranks the rooms:
//!
//! ```text
//! matrices ──► weights ──► global weights
//!                               │
//! rooms ──► leaf scores ──► hierarchy aggregation ──► ranking ──► AhpResult
//! ```
//!
//! Inconsistent matrices never block evaluation; they are reported through
//! the result's consistency flag and per-matrix ratios.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::aggregation::{rank_rooms, AggregationMethod, Aggregator, HierarchyWeights, DEFAULT_COMBINED_ALPHA};
use super::criteria::{LeafCriterion, MainCriterion, MAIN_MATRIX_KEY};
use super::pairwise_matrix::PairwiseMatrix;
use super::preferences::{ComparisonOverride, PreferenceConfiguration, PreferenceRequest};
use super::result::{AhpResult, CriterionScore, RawValue, RoomScore};
use super::room::{RoomData, UserRequirements};
use super::score_mapping::{
    map_air_quality, map_co2, map_equipment, map_humidity, map_light, map_noise, map_temperature,
    map_voc, ScoringPolicy,
};
use super::solver::{PrioritySolver, WeightMethod, CONSISTENCY_THRESHOLD};
use crate::domain::foundation::{DomainError, ErrorCode, EvaluationId, Timestamp, ValidationError};

/// Errors raised by engine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No rooms loaded, load candidate rooms before evaluating")]
    NoData,
}

impl From<EngineError> for DomainError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(e) => e.into(),
            EngineError::NoData => DomainError::new(ErrorCode::NoData, err.to_string()),
        }
    }
}

/// Tunables fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub weight_method: WeightMethod,
    /// Weighted-sum share in the combined aggregation.
    pub combined_alpha: f64,
    /// Consistency ratios at or above this are flagged.
    pub consistency_threshold: f64,
    pub scoring: ScoringPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            weight_method: WeightMethod::default(),
            combined_alpha: DEFAULT_COMBINED_ALPHA,
            consistency_threshold: CONSISTENCY_THRESHOLD,
            scoring: ScoringPolicy::default(),
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.combined_alpha) {
            return Err(ValidationError::out_of_range(
                "combined_alpha",
                0.0,
                1.0,
                self.combined_alpha,
            ));
        }
        if !(self.consistency_threshold > 0.0 && self.consistency_threshold <= 1.0) {
            return Err(ValidationError::out_of_range(
                "consistency_threshold",
                0.0,
                1.0,
                self.consistency_threshold,
            ));
        }
        self.scoring.validate()
    }
}

/// Weights and consistency ratio derived from one matrix.
struct MatrixSolution {
    weights: Vec<(String, f64)>,
    consistency_ratio: f64,
}

/// AHP decision engine for one ranking session.
#[derive(Debug, Clone)]
pub struct AhpEngine {
    settings: EngineSettings,
    main_matrix: PairwiseMatrix,
    sub_matrices: BTreeMap<MainCriterion, PairwiseMatrix>,
    main_weights: BTreeMap<MainCriterion, f64>,
    sub_weights: BTreeMap<MainCriterion, BTreeMap<LeafCriterion, f64>>,
    global_weights: BTreeMap<LeafCriterion, f64>,
    consistency_ratios: BTreeMap<String, f64>,
    is_consistent: bool,
    version: u64,
    /// Highest version handed out so far; versions are never reused.
    latest_version: u64,
    updated_at: Timestamp,
    requirements: UserRequirements,
    rooms: Vec<RoomData>,
}

impl Default for AhpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AhpEngine {
    /// Creates an engine seeded with the default comparison matrices.
    pub fn new() -> Self {
        Self::build(EngineSettings::default())
    }

    /// Creates an engine with custom settings.
    ///
    /// # Errors
    /// - `OutOfRange` / `InvalidFormat` if the settings are invalid
    pub fn with_settings(settings: EngineSettings) -> Result<Self, ValidationError> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    fn build(settings: EngineSettings) -> Self {
        let sub_matrices = MainCriterion::all()
            .iter()
            .map(|main| (*main, PairwiseMatrix::default_for(*main)))
            .collect();

        let mut engine = Self {
            settings,
            main_matrix: PairwiseMatrix::default_main(),
            sub_matrices,
            main_weights: BTreeMap::new(),
            sub_weights: BTreeMap::new(),
            global_weights: BTreeMap::new(),
            consistency_ratios: BTreeMap::new(),
            is_consistent: true,
            version: 0,
            latest_version: 0,
            updated_at: Timestamp::now(),
            requirements: UserRequirements::default(),
            rooms: Vec::new(),
        };
        engine.recompute_main();
        for main in MainCriterion::all() {
            engine.recompute_sub(*main);
        }
        engine.refresh_derived();
        engine
    }

    // ════════════════════════════════════════════════════════════════════════
    // Preferences
    // ════════════════════════════════════════════════════════════════════════

    /// Applies pairwise overrides to the main and/or sub matrices.
    ///
    /// Every override is validated before any matrix changes; on error the
    /// engine is left untouched. Only the matrices that received overrides
    /// are re-solved.
    ///
    /// # Errors
    /// - `UnknownCriterion` if a name is not part of the target matrix
    /// - `OutOfRange` if a value lies outside [1/9, 9]
    pub fn set_user_preferences(
        &mut self,
        main: Option<&[ComparisonOverride]>,
        sub: Option<&BTreeMap<MainCriterion, Vec<ComparisonOverride>>>,
    ) -> Result<PreferenceConfiguration, ValidationError> {
        let main = main.filter(|overrides| !overrides.is_empty());
        let sub: Vec<(MainCriterion, &Vec<ComparisonOverride>)> = sub
            .map(|groups| {
                groups
                    .iter()
                    .filter(|(_, overrides)| !overrides.is_empty())
                    .map(|(parent, overrides)| (*parent, overrides))
                    .collect()
            })
            .unwrap_or_default();

        // Validate everything first so a bad override cannot leave the
        // engine half-updated.
        if let Some(overrides) = main {
            for o in overrides {
                o.validate_against(&self.main_matrix)?;
            }
        }
        for (parent, overrides) in &sub {
            let matrix = self.sub_matrix(*parent)?;
            for o in overrides.iter() {
                o.validate_against(matrix)?;
            }
        }

        let mut main_matrix = self.main_matrix.clone();
        if let Some(overrides) = main {
            apply_overrides(&mut main_matrix, overrides)?;
        }
        let mut updated_subs = Vec::with_capacity(sub.len());
        for (parent, overrides) in &sub {
            let mut matrix = self.sub_matrix(*parent)?.clone();
            apply_overrides(&mut matrix, overrides)?;
            updated_subs.push((*parent, matrix));
        }

        if main.is_some() {
            self.main_matrix = main_matrix;
            self.recompute_main();
        }
        for (parent, matrix) in updated_subs {
            self.sub_matrices.insert(parent, matrix);
            self.recompute_sub(parent);
        }

        if main.is_some() || !sub.is_empty() {
            self.bump_version();
        }
        self.refresh_derived();

        debug!(
            version = self.version,
            main_changed = main.is_some(),
            sub_changed = sub.len(),
            is_consistent = self.is_consistent,
            "Applied user preferences"
        );

        Ok(self.configuration())
    }

    /// Applies a preference request and returns the new configuration.
    pub fn configure(
        &mut self,
        request: &PreferenceRequest,
    ) -> Result<PreferenceConfiguration, ValidationError> {
        self.set_user_preferences(Some(&request.main), Some(&request.sub))
    }

    /// Snapshot of the current preference state.
    pub fn configuration(&self) -> PreferenceConfiguration {
        PreferenceConfiguration {
            version: self.version,
            main_matrix: self.main_matrix.clone(),
            sub_matrices: self.sub_matrices.clone(),
            main_weights: self.main_weights.clone(),
            sub_weights: self.sub_weights.clone(),
            global_weights: self.global_weights.clone(),
            consistency_ratios: self.consistency_ratios.clone(),
            is_consistent: self.is_consistent,
            created_at: self.updated_at,
        }
    }

    /// Restores the matrices of an earlier snapshot.
    ///
    /// Every snapshot matrix is checked before anything changes. Weights and
    /// ratios are re-derived from the restored matrices, and the restored
    /// state gets a fresh version so no version number ever names two
    /// different configurations.
    ///
    /// # Errors
    /// - `InvalidFormat` if a matrix does not match the hierarchy, is not
    ///   reciprocal with a unit diagonal, or holds values outside [1/9, 9]
    pub fn rollback_to(&mut self, snapshot: &PreferenceConfiguration) -> Result<(), ValidationError> {
        if snapshot.main_matrix.criteria() != MainCriterion::names().as_slice() {
            return Err(ValidationError::invalid_format(
                "main_matrix",
                "criteria do not match the main criteria",
            ));
        }
        snapshot.main_matrix.ensure_valid("main_matrix")?;

        for main in MainCriterion::all() {
            let matrix = snapshot
                .sub_matrices
                .get(main)
                .filter(|m| m.criteria() == main.leaf_names().as_slice())
                .ok_or_else(|| {
                    ValidationError::invalid_format(
                        main.as_str(),
                        "sub-criteria matrix missing or mismatched",
                    )
                })?;
            matrix.ensure_valid(main.as_str())?;
        }

        self.main_matrix = snapshot.main_matrix.clone();
        self.sub_matrices = snapshot.sub_matrices.clone();
        self.recompute_main();
        for main in MainCriterion::all() {
            self.recompute_sub(*main);
        }
        self.bump_version();
        self.refresh_derived();

        info!(
            version = self.version,
            restored_from = snapshot.version,
            "Rolled back preference configuration"
        );
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════════
    // Inputs
    // ════════════════════════════════════════════════════════════════════════

    pub fn set_requirements(&mut self, requirements: UserRequirements) {
        self.requirements = requirements;
    }

    /// Replaces the candidate set.
    pub fn load_room_data(&mut self, rooms: Vec<RoomData>) {
        self.rooms = rooms;
    }

    /// Replaces the candidate set from loosely-shaped JSON records.
    ///
    /// All records are parsed before the current set is replaced.
    pub fn load_room_data_from_values(&mut self, records: &[Value]) -> Result<(), ValidationError> {
        let rooms = records
            .iter()
            .map(RoomData::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.rooms = rooms;
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════════
    // Evaluation
    // ════════════════════════════════════════════════════════════════════════

    /// Scores, aggregates and ranks every loaded room.
    ///
    /// # Errors
    /// - `NoData` if no rooms are loaded
    pub fn evaluate_rooms(&self, method: AggregationMethod) -> Result<AhpResult, EngineError> {
        if self.rooms.is_empty() {
            return Err(EngineError::NoData);
        }

        let aggregator = Aggregator::new(method).with_alpha(self.settings.combined_alpha);
        let hierarchy = self.hierarchy_weights();

        let scored: Vec<RoomScore> = self
            .rooms
            .iter()
            .map(|room| self.evaluate_room(room, &aggregator, &hierarchy))
            .collect();
        let rankings = rank_rooms(scored);

        if let Some(best) = rankings.first() {
            info!(
                rooms = rankings.len(),
                method = %method,
                best_room = %best.room_id,
                best_score = best.final_score,
                is_consistent = self.is_consistent,
                "Evaluated rooms"
            );
        }

        Ok(AhpResult {
            evaluation_id: EvaluationId::new(),
            rankings,
            global_weights: self.global_weights.clone(),
            main_weights: self.main_weights.clone(),
            consistency_ratios: self.consistency_ratios.clone(),
            is_consistent: self.is_consistent,
            method,
            evaluated_at: Timestamp::now(),
        })
    }

    fn evaluate_room(
        &self,
        room: &RoomData,
        aggregator: &Aggregator,
        hierarchy: &HierarchyWeights,
    ) -> RoomScore {
        let leaves = self.score_room(room);
        let leaf_scores: BTreeMap<LeafCriterion, f64> =
            leaves.iter().map(|(leaf, (_, score))| (*leaf, *score)).collect();

        let (final_score, main_scores) = aggregator.aggregate_hierarchy(&leaf_scores, hierarchy);
        let main_score = |main: MainCriterion| main_scores.get(&main).copied().unwrap_or(0.0);

        let mut scored = RoomScore::new(room.room_id.clone(), room.room_name.clone(), final_score);
        scored.comfort_score = main_score(MainCriterion::Comfort);
        scored.health_score = main_score(MainCriterion::Health);
        scored.usability_score = main_score(MainCriterion::Usability);
        scored.criterion_scores = leaves
            .into_iter()
            .map(|(leaf, (raw_value, normalized_score))| CriterionScore {
                criterion_id: leaf,
                criterion_name: leaf.label().to_string(),
                raw_value,
                normalized_score,
                weight: self.global_weights.get(&leaf).copied().unwrap_or(0.0),
            })
            .collect();
        scored
    }

    /// Raw value and [0, 1] score for every leaf.
    fn score_room(&self, room: &RoomData) -> BTreeMap<LeafCriterion, (RawValue, f64)> {
        let policy = &self.settings.scoring;
        let requirements = &self.requirements;

        let sensor = |value: Option<f64>, map: fn(f64) -> f64| {
            (RawValue::from_reading(value), policy.score_or_missing(value, map))
        };

        LeafCriterion::all()
            .iter()
            .map(|leaf| {
                let entry = match leaf {
                    LeafCriterion::Temperature => sensor(room.temperature, map_temperature),
                    LeafCriterion::Lighting => sensor(room.light, map_light),
                    LeafCriterion::Noise => sensor(room.noise, map_noise),
                    LeafCriterion::Humidity => sensor(room.humidity, map_humidity),
                    LeafCriterion::Co2 => sensor(room.co2, map_co2),
                    LeafCriterion::AirQuality => sensor(room.air_quality, map_air_quality),
                    LeafCriterion::Voc => sensor(room.voc, map_voc),
                    LeafCriterion::SeatingCapacity => (
                        RawValue::Count(room.seating_capacity),
                        policy.seating_score(room.seating_capacity, requirements.required_seats),
                    ),
                    LeafCriterion::Equipment => (
                        RawValue::Count(room.computers),
                        map_equipment(room.computers, requirements.need_computers),
                    ),
                    LeafCriterion::AvFacilities => (
                        RawValue::Flag(room.has_projector),
                        policy.av_score(room.has_projector, requirements.need_projector),
                    ),
                };
                (*leaf, entry)
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Accessors
    // ════════════════════════════════════════════════════════════════════════

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn main_weights(&self) -> &BTreeMap<MainCriterion, f64> {
        &self.main_weights
    }

    pub fn sub_weights(&self) -> &BTreeMap<MainCriterion, BTreeMap<LeafCriterion, f64>> {
        &self.sub_weights
    }

    pub fn global_weights(&self) -> &BTreeMap<LeafCriterion, f64> {
        &self.global_weights
    }

    /// Ratios keyed `"main"`, `"Comfort"`, `"Health"` and `"Usability"`.
    pub fn consistency_ratios(&self) -> &BTreeMap<String, f64> {
        &self.consistency_ratios
    }

    pub fn is_consistent(&self) -> bool {
        self.is_consistent
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn requirements(&self) -> &UserRequirements {
        &self.requirements
    }

    pub fn rooms(&self) -> &[RoomData] {
        &self.rooms
    }

    pub fn main_matrix(&self) -> &PairwiseMatrix {
        &self.main_matrix
    }

    pub fn sub_matrix(&self, parent: MainCriterion) -> Result<&PairwiseMatrix, ValidationError> {
        self.sub_matrices
            .get(&parent)
            .ok_or_else(|| ValidationError::unknown_criterion(parent.as_str()))
    }

    /// Main and sub weights in the shape the aggregator expects.
    pub fn hierarchy_weights(&self) -> HierarchyWeights {
        HierarchyWeights {
            main: self.main_weights.clone(),
            sub: self.sub_weights.clone(),
        }
    }

    /// Text overview of weights and consistency ratios.
    pub fn weights_summary(&self) -> String {
        let rule = "=".repeat(40);
        let mut lines = vec![
            rule.clone(),
            "AHP WEIGHTS SUMMARY".to_string(),
            rule,
            String::new(),
            "MAIN CRITERIA:".to_string(),
        ];
        for (main, weight) in &self.main_weights {
            lines.push(format!("  {}: {:.4} ({:.1}%)", main, weight, weight * 100.0));
        }

        lines.push("\nSUB-CRITERIA:".to_string());
        for (main, weights) in &self.sub_weights {
            lines.push(format!("\n  {}:", main));
            for (leaf, weight) in weights {
                let global = self.global_weights.get(leaf).copied().unwrap_or(0.0);
                lines.push(format!("    {}: {:.4} (global: {:.4})", leaf, weight, global));
            }
        }

        lines.push("\nCONSISTENCY RATIOS:".to_string());
        for (name, cr) in &self.consistency_ratios {
            let status = if *cr < self.settings.consistency_threshold {
                "OK"
            } else {
                "FAIL"
            };
            lines.push(format!("  {}: {:.4} {}", name, cr, status));
        }

        lines.join("\n")
    }

    // ════════════════════════════════════════════════════════════════════════
    // Derivation
    // ════════════════════════════════════════════════════════════════════════

    fn recompute_main(&mut self) {
        let solution = self.solve(MAIN_MATRIX_KEY, &self.main_matrix);
        self.main_weights = solution
            .weights
            .into_iter()
            .filter_map(|(name, w)| name.parse::<MainCriterion>().ok().map(|c| (c, w)))
            .collect();
        self.consistency_ratios
            .insert(MAIN_MATRIX_KEY.to_string(), solution.consistency_ratio);
    }

    fn recompute_sub(&mut self, parent: MainCriterion) {
        let Some(matrix) = self.sub_matrices.get(&parent) else {
            return;
        };
        let solution = self.solve(parent.as_str(), matrix);
        let weights = solution
            .weights
            .into_iter()
            .filter_map(|(name, w)| name.parse::<LeafCriterion>().ok().map(|c| (c, w)))
            .collect();
        self.sub_weights.insert(parent, weights);
        self.consistency_ratios
            .insert(parent.as_str().to_string(), solution.consistency_ratio);
    }

    fn solve(&self, name: &str, matrix: &PairwiseMatrix) -> MatrixSolution {
        let values = matrix.values();
        let n = matrix.len();

        let weights = PrioritySolver::weights(values, self.settings.weight_method)
            .unwrap_or_else(|e| {
                warn!(matrix = name, error = %e, "Weight derivation failed, using equal weights");
                vec![1.0 / n as f64; n]
            });
        let consistency_ratio = PrioritySolver::consistency_ratio(values, Some(&weights))
            .map(|cr| cr.ratio)
            .unwrap_or_else(|e| {
                warn!(matrix = name, error = %e, "Consistency check failed");
                0.0
            });

        if consistency_ratio >= self.settings.consistency_threshold {
            warn!(
                matrix = name,
                consistency_ratio,
                threshold = self.settings.consistency_threshold,
                "Comparison matrix is inconsistent"
            );
        } else {
            debug!(matrix = name, consistency_ratio, "Derived priority weights");
        }

        MatrixSolution {
            weights: matrix.criteria().iter().cloned().zip(weights).collect(),
            consistency_ratio,
        }
    }

    fn bump_version(&mut self) {
        self.latest_version += 1;
        self.version = self.latest_version;
        self.updated_at = Timestamp::now();
    }

    /// Recomputes global weights and the overall consistency flag.
    fn refresh_derived(&mut self) {
        self.global_weights = self
            .main_weights
            .iter()
            .filter_map(|(main, main_weight)| {
                self.sub_weights
                    .get(main)
                    .map(|subs| subs.iter().map(move |(leaf, w)| (*leaf, main_weight * w)))
            })
            .flatten()
            .collect();

        let threshold = self.settings.consistency_threshold;
        self.is_consistent = self.consistency_ratios.values().all(|cr| *cr < threshold);
    }
}

fn apply_overrides(
    matrix: &mut PairwiseMatrix,
    overrides: &[ComparisonOverride],
) -> Result<(), ValidationError> {
    for o in overrides {
        if o.criterion_a == o.criterion_b {
            continue;
        }
        matrix.set_comparison(&o.criterion_a, &o.criterion_b, o.value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn ideal_room() -> RoomData {
        RoomData {
            temperature: Some(22.0),
            co2: Some(600.0),
            humidity: Some(48.0),
            light: Some(450.0),
            noise: Some(28.0),
            voc: Some(120.0),
            air_quality: Some(30.0),
            seating_capacity: 40,
            has_projector: true,
            computers: 25,
            ..RoomData::new("ideal", "Ideal Room")
        }
    }

    fn poor_room() -> RoomData {
        RoomData {
            temperature: Some(26.5),
            co2: Some(950.0),
            humidity: Some(62.0),
            light: Some(280.0),
            noise: Some(45.0),
            voc: Some(250.0),
            air_quality: Some(65.0),
            seating_capacity: 12,
            ..RoomData::new("poor", "Poor Room")
        }
    }

    // Construction Tests

    #[test]
    fn default_weights_are_normalized() {
        let engine = AhpEngine::new();
        let main_sum: f64 = engine.main_weights().values().sum();
        assert!(approx(main_sum, 1.0));
        for weights in engine.sub_weights().values() {
            assert!(approx(weights.values().sum::<f64>(), 1.0));
        }
        let global_sum: f64 = engine.global_weights().values().sum();
        assert!(approx(global_sum, 1.0));
        assert_eq!(engine.global_weights().len(), 10);
    }

    #[test]
    fn default_weights_follow_seed_preferences() {
        let engine = AhpEngine::new();
        let main = engine.main_weights();
        assert!(main[&MainCriterion::Comfort] > main[&MainCriterion::Health]);
        assert!(main[&MainCriterion::Health] > main[&MainCriterion::Usability]);
        let comfort = &engine.sub_weights()[&MainCriterion::Comfort];
        assert!(comfort[&LeafCriterion::Temperature] > comfort[&LeafCriterion::Humidity]);
    }

    #[test]
    fn default_matrices_are_consistent() {
        let engine = AhpEngine::new();
        assert!(engine.is_consistent());
        let keys: Vec<_> = engine.consistency_ratios().keys().cloned().collect();
        assert_eq!(keys, vec!["Comfort", "Health", "Usability", "main"]);
        assert_eq!(engine.version(), 0);
    }

    #[test]
    fn global_weight_is_product_of_levels() {
        let engine = AhpEngine::new();
        let expected = engine.main_weights()[&MainCriterion::Health]
            * engine.sub_weights()[&MainCriterion::Health][&LeafCriterion::Co2];
        assert!(approx(engine.global_weights()[&LeafCriterion::Co2], expected));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = EngineSettings {
            combined_alpha: 1.5,
            ..EngineSettings::default()
        };
        assert!(AhpEngine::with_settings(settings).is_err());
        let settings = EngineSettings {
            consistency_threshold: 0.0,
            ..EngineSettings::default()
        };
        assert!(AhpEngine::with_settings(settings).is_err());
    }

    // Preference Tests

    #[test]
    fn main_override_shifts_weights() {
        let mut engine = AhpEngine::new();
        let overrides = vec![
            ComparisonOverride::new("Health", "Comfort", 5.0),
            ComparisonOverride::new("Health", "Usability", 5.0),
        ];
        let config = engine.set_user_preferences(Some(&overrides), None).unwrap();
        let main = engine.main_weights();
        assert!(main[&MainCriterion::Health] > main[&MainCriterion::Comfort]);
        assert_eq!(config.version, 1);
        assert!(approx(
            engine.main_matrix().get_comparison("Comfort", "Health").unwrap(),
            0.2
        ));
    }

    #[test]
    fn sub_override_only_touches_its_matrix() {
        let mut engine = AhpEngine::new();
        let before = engine.sub_weights()[&MainCriterion::Comfort].clone();
        let request = PreferenceRequest::new().with_sub(MainCriterion::Health, "VOC", "CO2", 3.0);
        engine.configure(&request).unwrap();
        assert_eq!(engine.sub_weights()[&MainCriterion::Comfort], before);
        let health = &engine.sub_weights()[&MainCriterion::Health];
        assert!(health[&LeafCriterion::Voc] > health[&LeafCriterion::Co2]);
    }

    #[test]
    fn invalid_override_leaves_engine_untouched() {
        let mut engine = AhpEngine::new();
        let before = engine.configuration();
        let request = PreferenceRequest::new()
            .with_main("Comfort", "Health", 3.0)
            .with_sub(MainCriterion::Comfort, "Temperature", "Parking", 2.0);

        let err = engine.configure(&request).unwrap_err();
        assert_eq!(err, ValidationError::unknown_criterion("Parking"));
        assert_eq!(engine.main_weights(), &before.main_weights);
        assert_eq!(engine.version(), 0);
    }

    #[test]
    fn out_of_range_override_is_rejected() {
        let mut engine = AhpEngine::new();
        let overrides = vec![ComparisonOverride::new("Comfort", "Health", 12.0)];
        assert!(matches!(
            engine.set_user_preferences(Some(&overrides), None),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn cyclic_overrides_flag_inconsistency() {
        let mut engine = AhpEngine::new();
        let request = PreferenceRequest::new()
            .with_main("Comfort", "Health", 9.0)
            .with_main("Health", "Usability", 9.0)
            .with_main("Usability", "Comfort", 9.0);
        let config = engine.configure(&request).unwrap();
        assert!(!config.is_consistent);
        assert!(!engine.is_consistent());
        assert!(engine.consistency_ratios()[MAIN_MATRIX_KEY] >= CONSISTENCY_THRESHOLD);
        assert!(engine.weights_summary().contains("FAIL"));
    }

    #[test]
    fn rollback_restores_earlier_snapshot() {
        let mut engine = AhpEngine::new();
        let original = engine.configuration();
        engine
            .configure(&PreferenceRequest::new().with_main("Usability", "Comfort", 7.0))
            .unwrap();
        assert_ne!(engine.main_weights(), &original.main_weights);

        engine.rollback_to(&original).unwrap();
        assert_eq!(engine.version(), 2);
        for (main, weight) in &original.main_weights {
            assert!(approx(engine.main_weights()[main], *weight));
        }
    }

    #[test]
    fn versions_are_never_reused_after_rollback() {
        let mut engine = AhpEngine::new();
        let original = engine.configuration();

        let health_first = engine
            .configure(&PreferenceRequest::new().with_main("Health", "Comfort", 9.0))
            .unwrap();
        engine.rollback_to(&original).unwrap();
        let usability_first = engine
            .configure(&PreferenceRequest::new().with_main("Usability", "Comfort", 9.0))
            .unwrap();

        assert_eq!(health_first.version, 1);
        assert_eq!(usability_first.version, 3);
        assert_ne!(health_first.main_weights, usability_first.main_weights);
    }

    #[test]
    fn rollback_rejects_corrupt_snapshot() {
        let mut engine = AhpEngine::new();
        engine
            .configure(&PreferenceRequest::new().with_main("Health", "Comfort", 3.0))
            .unwrap();
        let before = engine.configuration();

        let mut snapshot = engine.configuration();
        let broken = nalgebra::DMatrix::from_row_slice(
            3,
            3,
            &[1.0, 500.0, -3.0, 500.0, 1.0, 2.0, 0.0, 2.0, 7.0],
        );
        snapshot.main_matrix = PairwiseMatrix::from_matrix(&MainCriterion::names(), broken).unwrap();

        let err = engine.rollback_to(&snapshot).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
        assert_eq!(engine.version(), before.version);
        assert_eq!(engine.main_matrix(), &before.main_matrix);
        assert_eq!(engine.main_weights(), &before.main_weights);
        assert_eq!(engine.consistency_ratios(), &before.consistency_ratios);
    }

    #[test]
    fn rollback_rejects_out_of_scale_sub_matrix() {
        let mut engine = AhpEngine::new();
        let mut snapshot = engine.configuration();
        let leaves = MainCriterion::Health.leaf_names();
        let reciprocal_but_huge = nalgebra::DMatrix::from_row_slice(
            3,
            3,
            &[1.0, 50.0, 1.0, 0.02, 1.0, 0.02, 1.0, 50.0, 1.0],
        );
        snapshot.sub_matrices.insert(
            MainCriterion::Health,
            PairwiseMatrix::from_matrix(&leaves, reciprocal_but_huge).unwrap(),
        );

        let err = engine.rollback_to(&snapshot).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { ref field, .. } if field == "Health"));
        assert_eq!(engine.version(), 0);
    }

    #[test]
    fn configuration_diff_reports_moved_weights() {
        let mut engine = AhpEngine::new();
        let before = engine.configuration();
        let after = engine
            .configure(&PreferenceRequest::new().with_sub(
                MainCriterion::Usability,
                "AVFacilities",
                "SeatingCapacity",
                5.0,
            ))
            .unwrap();
        let changes = before.weight_changes(&after, 1e-9);
        assert!(changes.contains_key(&LeafCriterion::AvFacilities));
        assert!(!changes.contains_key(&LeafCriterion::Temperature));
    }

    // Evaluation Tests

    #[test]
    fn evaluate_without_rooms_is_no_data() {
        let engine = AhpEngine::new();
        assert_eq!(
            engine.evaluate_rooms(AggregationMethod::WeightedSum).unwrap_err(),
            EngineError::NoData
        );
    }

    #[test]
    fn ideal_room_beats_poor_room() {
        let mut engine = AhpEngine::new();
        engine.load_room_data(vec![poor_room(), ideal_room()]);
        for method in [
            AggregationMethod::WeightedSum,
            AggregationMethod::WeightedProduct,
            AggregationMethod::Combined,
        ] {
            let result = engine.evaluate_rooms(method).unwrap();
            assert_eq!(result.rankings[0].room_id, "ideal");
            assert_eq!(result.rankings[0].rank, 1);
            assert_eq!(result.rankings[1].rank, 2);
            assert_eq!(result.method, method);
        }
    }

    #[test]
    fn breakdown_covers_every_leaf() {
        let mut engine = AhpEngine::new();
        engine.load_room_data(vec![ideal_room()]);
        let result = engine.evaluate_rooms(AggregationMethod::WeightedSum).unwrap();
        let room = &result.rankings[0];

        assert_eq!(room.criterion_scores.len(), 10);
        let temp = room.criterion(LeafCriterion::Temperature).unwrap();
        assert_eq!(temp.raw_value, RawValue::Number(22.0));
        assert_eq!(temp.normalized_score, 1.0);
        assert!(approx(temp.weight, engine.global_weights()[&LeafCriterion::Temperature]));

        let av = room.criterion(LeafCriterion::AvFacilities).unwrap();
        assert_eq!(av.raw_value, RawValue::Flag(true));
        assert_eq!(av.criterion_name, "A/V Facilities");
    }

    #[test]
    fn missing_readings_score_neutral() {
        let mut engine = AhpEngine::new();
        engine.load_room_data(vec![RoomData::new("bare", "Bare")]);
        let result = engine.evaluate_rooms(AggregationMethod::WeightedSum).unwrap();
        let room = &result.rankings[0];
        let co2 = room.criterion(LeafCriterion::Co2).unwrap();
        assert!(co2.raw_value.is_missing());
        assert_eq!(co2.normalized_score, 0.5);
        assert!(approx(room.health_score, 0.5));
    }

    #[test]
    fn final_score_is_weighted_sum_of_global_weights() {
        let mut engine = AhpEngine::new();
        engine.load_room_data(vec![poor_room()]);
        let result = engine.evaluate_rooms(AggregationMethod::WeightedSum).unwrap();
        let room = &result.rankings[0];
        let expected: f64 = room.criterion_scores.iter().map(CriterionScore::contribution).sum();
        assert!(approx(room.final_score, expected));
    }

    #[test]
    fn requirements_drive_facility_scores() {
        let mut engine = AhpEngine::new();
        engine.load_room_data(vec![poor_room()]);
        engine.set_requirements(UserRequirements::new(30, true, 10));
        let result = engine.evaluate_rooms(AggregationMethod::WeightedSum).unwrap();
        let room = &result.rankings[0];
        assert_eq!(room.criterion(LeafCriterion::SeatingCapacity).unwrap().normalized_score, 0.0);
        assert_eq!(room.criterion(LeafCriterion::Equipment).unwrap().normalized_score, 0.0);
        assert_eq!(room.criterion(LeafCriterion::AvFacilities).unwrap().normalized_score, 0.0);
        assert_eq!(room.usability_score, 0.0);
    }

    #[test]
    fn scoring_policy_is_applied() {
        let settings = EngineSettings {
            scoring: ScoringPolicy {
                av_unrequested_absent_score: 0.3,
                ..ScoringPolicy::default()
            },
            ..EngineSettings::default()
        };
        let mut engine = AhpEngine::with_settings(settings).unwrap();
        engine.load_room_data(vec![poor_room()]);
        let result = engine.evaluate_rooms(AggregationMethod::WeightedSum).unwrap();
        let av = result.rankings[0].criterion(LeafCriterion::AvFacilities).unwrap();
        assert_eq!(av.normalized_score, 0.3);
    }

    #[test]
    fn rooms_load_from_heterogeneous_values() {
        let mut engine = AhpEngine::new();
        engine
            .load_room_data_from_values(&[
                json!({"id": "a", "temperature": 22.0, "facilities": {"seating_capacity": 30}}),
                json!({"room_id": "b", "seating_capacity": 10}),
            ])
            .unwrap();
        assert_eq!(engine.rooms().len(), 2);
        assert_eq!(engine.rooms()[0].seating_capacity, 30);

        let err = engine.load_room_data_from_values(&[json!({"temperature": 20.0})]);
        assert!(err.is_err());
        assert_eq!(engine.rooms().len(), 2);
    }

    #[test]
    fn weights_summary_lists_sections() {
        let summary = AhpEngine::new().weights_summary();
        assert!(summary.contains("MAIN CRITERIA:"));
        assert!(summary.contains("SUB-CRITERIA:"));
        assert!(summary.contains("CONSISTENCY RATIOS:"));
        assert!(summary.contains("main:"));
        assert!(!summary.contains("FAIL"));
    }

    #[test]
    fn engine_error_maps_to_domain_error() {
        let err: DomainError = EngineError::NoData.into();
        assert_eq!(err.code, ErrorCode::NoData);
        let err: DomainError = EngineError::from(ValidationError::unknown_criterion("X")).into();
        assert_eq!(err.code, ErrorCode::UnknownCriterion);
    }
}
