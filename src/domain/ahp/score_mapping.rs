//! Score Mapping - Raw measurements to [0, 1] suitability scores.
//!
//! Continuous sensor readings use one of two band shapes (centered range or
//! lower-is-better) parametrized by a [`MappingConfig`] drawn from indoor
//! environment standards. Facility attributes use threshold and ratio rules
//! whose tuning lives in [`ScoringPolicy`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Score assigned to a leaf whose measurement is absent.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Capacity used by occupancy mapping when the room reports none.
pub const DEFAULT_ROOM_CAPACITY: u32 = 30;

/// Curve family used to score a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingShape {
    /// Best inside an optimal band, worse on either side.
    CenteredRange,
    /// Best at zero, worse as the value grows.
    LowerIsBetter,
}

/// Band definition for one physical measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappingConfig {
    pub name: &'static str,
    pub unit: &'static str,
    pub shape: MappingShape,
    pub optimal_min: f64,
    pub optimal_max: f64,
    pub acceptable_min: f64,
    pub acceptable_max: f64,
    pub standard: &'static str,
}

impl MappingConfig {
    pub const TEMPERATURE: MappingConfig = MappingConfig {
        name: "Temperature",
        unit: "°C",
        shape: MappingShape::CenteredRange,
        optimal_min: 20.0,
        optimal_max: 24.0,
        acceptable_min: 18.0,
        acceptable_max: 26.0,
        standard: "EN 16798-1, Category II for office spaces",
    };

    pub const CO2: MappingConfig = MappingConfig {
        name: "CO2",
        unit: "ppm",
        shape: MappingShape::LowerIsBetter,
        optimal_min: 0.0,
        optimal_max: 600.0,
        acceptable_min: 0.0,
        acceptable_max: 1000.0,
        standard: "EN 16798-1, Category II",
    };

    pub const HUMIDITY: MappingConfig = MappingConfig {
        name: "Humidity",
        unit: "%RH",
        shape: MappingShape::CenteredRange,
        optimal_min: 40.0,
        optimal_max: 60.0,
        acceptable_min: 30.0,
        acceptable_max: 70.0,
        standard: "EN 16798-1",
    };

    pub const LIGHT: MappingConfig = MappingConfig {
        name: "Light Intensity",
        unit: "lux",
        shape: MappingShape::CenteredRange,
        optimal_min: 300.0,
        optimal_max: 500.0,
        acceptable_min: 200.0,
        acceptable_max: 750.0,
        standard: "EN 12464-1 for office and classroom lighting",
    };

    pub const NOISE: MappingConfig = MappingConfig {
        name: "Noise",
        unit: "dBA",
        shape: MappingShape::LowerIsBetter,
        optimal_min: 0.0,
        optimal_max: 35.0,
        acceptable_min: 0.0,
        acceptable_max: 45.0,
        standard: "WHO guidelines and EN 16798-1",
    };

    pub const VOC: MappingConfig = MappingConfig {
        name: "VOC",
        unit: "ppb",
        shape: MappingShape::LowerIsBetter,
        optimal_min: 0.0,
        optimal_max: 200.0,
        acceptable_min: 0.0,
        acceptable_max: 400.0,
        standard: "WELL Building Standard",
    };

    pub const AIR_QUALITY: MappingConfig = MappingConfig {
        name: "Air Quality Index",
        unit: "AQI",
        shape: MappingShape::LowerIsBetter,
        optimal_min: 0.0,
        optimal_max: 50.0,
        acceptable_min: 0.0,
        acceptable_max: 100.0,
        standard: "US EPA AQI adapted for indoor use",
    };

    pub const OCCUPANCY: MappingConfig = MappingConfig {
        name: "Occupancy",
        unit: "count",
        shape: MappingShape::LowerIsBetter,
        optimal_min: 0.0,
        optimal_max: 10.0,
        acceptable_min: 0.0,
        acceptable_max: 25.0,
        standard: "Person count, lower is better for focused work",
    };

    /// Scores a value with this configuration's curve.
    pub fn score(&self, value: f64) -> f64 {
        match self.shape {
            MappingShape::CenteredRange => map_range_centered(value, self),
            MappingShape::LowerIsBetter => map_lower_is_better(value, self),
        }
    }
}

pub fn map_temperature(value: f64) -> f64 {
    MappingConfig::TEMPERATURE.score(value)
}

pub fn map_co2(value: f64) -> f64 {
    MappingConfig::CO2.score(value)
}

pub fn map_humidity(value: f64) -> f64 {
    MappingConfig::HUMIDITY.score(value)
}

pub fn map_light(value: f64) -> f64 {
    MappingConfig::LIGHT.score(value)
}

pub fn map_noise(value: f64) -> f64 {
    MappingConfig::NOISE.score(value)
}

pub fn map_voc(value: f64) -> f64 {
    MappingConfig::VOC.score(value)
}

pub fn map_air_quality(value: f64) -> f64 {
    MappingConfig::AIR_QUALITY.score(value)
}

/// Maps a person count against room capacity.
///
/// Bands by occupancy ratio: up to 33% scores 1.0→0.8, up to 66% 0.8→0.5,
/// up to 100% 0.5→0.2, and over capacity 0.2→0 (reaching 0 at 50% over).
///
/// # Edge Cases
/// - Non-positive count scores 1.0
/// - Zero capacity falls back to 30 seats
pub fn map_occupancy(value: f64, capacity: u32) -> f64 {
    if value <= 0.0 {
        return 1.0;
    }
    let capacity = if capacity == 0 {
        DEFAULT_ROOM_CAPACITY
    } else {
        capacity
    };
    let ratio = value / f64::from(capacity);

    if ratio <= 0.33 {
        1.0 - (ratio / 0.33) * 0.2
    } else if ratio <= 0.66 {
        0.8 - ((ratio - 0.33) / 0.33) * 0.3
    } else if ratio <= 1.0 {
        0.5 - ((ratio - 0.66) / 0.34) * 0.3
    } else {
        let over = (ratio - 1.0).min(0.5);
        (0.2 - (over / 0.5) * 0.2).max(0.0)
    }
}

/// Seating score with the default policy.
pub fn map_seating_capacity(available: u32, required: u32) -> f64 {
    ScoringPolicy::DEFAULT.seating_score(available, required)
}

/// Computer availability score.
///
/// No requirement scores 1.0 whether or not computers exist.
pub fn map_equipment(available: u32, required: u32) -> f64 {
    if required == 0 {
        return 1.0;
    }
    if available == 0 {
        return 0.0;
    }
    (f64::from(available) / f64::from(required)).min(1.0)
}

/// Projector score with the default policy.
pub fn map_av_facilities(has_projector: bool, required: bool) -> f64 {
    ScoringPolicy::DEFAULT.av_score(has_projector, required)
}

fn map_range_centered(value: f64, config: &MappingConfig) -> f64 {
    let MappingConfig {
        optimal_min,
        optimal_max,
        acceptable_min,
        acceptable_max,
        ..
    } = *config;

    if (optimal_min..=optimal_max).contains(&value) {
        return 1.0;
    }

    if value >= acceptable_min && value < optimal_min {
        let gap = optimal_min - acceptable_min;
        if gap == 0.0 {
            return NEUTRAL_SCORE;
        }
        return 0.5 + 0.5 * (value - acceptable_min) / gap;
    }

    if value > optimal_max && value <= acceptable_max {
        let gap = acceptable_max - optimal_max;
        if gap == 0.0 {
            return NEUTRAL_SCORE;
        }
        return 1.0 - 0.5 * (value - optimal_max) / gap;
    }

    // Outside the acceptable band the score falls from 0.5 to 0 over half
    // the band width.
    let span = (acceptable_max - acceptable_min) / 2.0;
    if span <= 0.0 {
        return 0.0;
    }
    let distance = if value < acceptable_min {
        acceptable_min - value
    } else {
        value - acceptable_max
    };
    let decay = (distance / span).min(1.0);
    (0.5 * (1.0 - decay)).max(0.0)
}

fn map_lower_is_better(value: f64, config: &MappingConfig) -> f64 {
    let optimal_max = config.optimal_max;
    let acceptable_max = config.acceptable_max;

    if value <= 0.0 || value <= optimal_max {
        return 1.0;
    }

    if value <= acceptable_max {
        let gap = acceptable_max - optimal_max;
        if gap == 0.0 {
            return NEUTRAL_SCORE;
        }
        return 1.0 - 0.5 * (value - optimal_max) / gap;
    }

    if acceptable_max <= 0.0 {
        return 0.0;
    }
    let decay = ((value - acceptable_max) / acceptable_max).min(1.0);
    (0.5 * (1.0 - decay)).max(0.0)
}

// ════════════════════════════════════════════════════════════════════════════
// Scoring policy
// ════════════════════════════════════════════════════════════════════════════

/// Tunable constants for the facility scoring rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Below this seat ratio a room scores 0.
    #[serde(default = "default_seating_min_ratio")]
    pub seating_min_ratio: f64,

    /// From this seat ratio a room scores 1.
    #[serde(default = "default_seating_full_ratio")]
    pub seating_full_ratio: f64,

    /// Above this seat ratio the oversize penalty starts.
    #[serde(default = "default_seating_oversize_ratio")]
    pub seating_oversize_ratio: f64,

    /// Score lost per unit of ratio above the oversize ratio.
    #[serde(default = "default_seating_oversize_decay")]
    pub seating_oversize_decay: f64,

    /// Lowest score an oversized room can get.
    #[serde(default = "default_seating_oversize_floor")]
    pub seating_oversize_floor: f64,

    /// Score for a room without projector when none was asked for.
    #[serde(default = "default_av_unrequested_absent_score")]
    pub av_unrequested_absent_score: f64,

    /// Score for an absent sensor measurement.
    #[serde(default = "default_missing_value_score")]
    pub missing_value_score: f64,
}

fn default_seating_min_ratio() -> f64 {
    ScoringPolicy::DEFAULT.seating_min_ratio
}

fn default_seating_full_ratio() -> f64 {
    ScoringPolicy::DEFAULT.seating_full_ratio
}

fn default_seating_oversize_ratio() -> f64 {
    ScoringPolicy::DEFAULT.seating_oversize_ratio
}

fn default_seating_oversize_decay() -> f64 {
    ScoringPolicy::DEFAULT.seating_oversize_decay
}

fn default_seating_oversize_floor() -> f64 {
    ScoringPolicy::DEFAULT.seating_oversize_floor
}

fn default_av_unrequested_absent_score() -> f64 {
    ScoringPolicy::DEFAULT.av_unrequested_absent_score
}

fn default_missing_value_score() -> f64 {
    ScoringPolicy::DEFAULT.missing_value_score
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ScoringPolicy {
    pub const DEFAULT: ScoringPolicy = ScoringPolicy {
        seating_min_ratio: 0.5,
        seating_full_ratio: 0.8,
        seating_oversize_ratio: 1.5,
        seating_oversize_decay: 0.1,
        seating_oversize_floor: 0.5,
        av_unrequested_absent_score: 0.8,
        missing_value_score: NEUTRAL_SCORE,
    };

    /// Scores available seats against the required count.
    ///
    /// # Edge Cases
    /// - No requirement: 1.0 if the room has any seats, else 0.5
    /// - Ratio in `[min, full)` ramps linearly from 0.5 to 1.0
    /// - Oversized rooms lose score linearly but never drop below the floor
    pub fn seating_score(&self, available: u32, required: u32) -> f64 {
        if required == 0 {
            return if available > 0 { 1.0 } else { NEUTRAL_SCORE };
        }

        let ratio = f64::from(available) / f64::from(required);
        if ratio < self.seating_min_ratio {
            return 0.0;
        }
        if ratio < self.seating_full_ratio {
            let band = self.seating_full_ratio - self.seating_min_ratio;
            return (0.5 + (ratio - self.seating_min_ratio) * (0.5 / band)).max(0.0);
        }
        if ratio <= self.seating_oversize_ratio {
            return 1.0;
        }
        (1.0 - (ratio - self.seating_oversize_ratio) * self.seating_oversize_decay)
            .max(self.seating_oversize_floor)
    }

    /// Scores projector availability.
    pub fn av_score(&self, has_projector: bool, required: bool) -> f64 {
        match (has_projector, required) {
            (true, _) => 1.0,
            (false, true) => 0.0,
            (false, false) => self.av_unrequested_absent_score,
        }
    }

    /// Scores an optional measurement, substituting the missing-value score.
    pub fn score_or_missing(&self, value: Option<f64>, map: impl Fn(f64) -> f64) -> f64 {
        value.map(map).unwrap_or(self.missing_value_score)
    }

    /// Checks band ordering and that every score lies in [0, 1].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.seating_min_ratio >= 0.0 && self.seating_min_ratio < self.seating_full_ratio) {
            return Err(ValidationError::invalid_format(
                "seating_min_ratio",
                "must be non-negative and below seating_full_ratio",
            ));
        }
        if self.seating_oversize_ratio < self.seating_full_ratio {
            return Err(ValidationError::invalid_format(
                "seating_oversize_ratio",
                "must not be below seating_full_ratio",
            ));
        }
        if !(self.seating_oversize_decay >= 0.0) {
            return Err(ValidationError::out_of_range(
                "seating_oversize_decay",
                0.0,
                f64::INFINITY,
                self.seating_oversize_decay,
            ));
        }
        for (field, value) in [
            ("seating_oversize_floor", self.seating_oversize_floor),
            ("av_unrequested_absent_score", self.av_unrequested_absent_score),
            ("missing_value_score", self.missing_value_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::out_of_range(field, 0.0, 1.0, value));
            }
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Sensor registry
// ════════════════════════════════════════════════════════════════════════════

/// Sensor types with a registered mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Temperature,
    Co2,
    Humidity,
    Light,
    Noise,
    Voc,
    AirQuality,
    Occupancy,
}

impl SensorKind {
    pub fn all() -> &'static [SensorKind] {
        &[
            SensorKind::Temperature,
            SensorKind::Co2,
            SensorKind::Humidity,
            SensorKind::Light,
            SensorKind::Noise,
            SensorKind::Voc,
            SensorKind::AirQuality,
            SensorKind::Occupancy,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "temperature",
            SensorKind::Co2 => "co2",
            SensorKind::Humidity => "humidity",
            SensorKind::Light => "light",
            SensorKind::Noise => "noise",
            SensorKind::Voc => "voc",
            SensorKind::AirQuality => "air_quality",
            SensorKind::Occupancy => "occupancy",
        }
    }

    pub fn config(&self) -> &'static MappingConfig {
        match self {
            SensorKind::Temperature => &MappingConfig::TEMPERATURE,
            SensorKind::Co2 => &MappingConfig::CO2,
            SensorKind::Humidity => &MappingConfig::HUMIDITY,
            SensorKind::Light => &MappingConfig::LIGHT,
            SensorKind::Noise => &MappingConfig::NOISE,
            SensorKind::Voc => &MappingConfig::VOC,
            SensorKind::AirQuality => &MappingConfig::AIR_QUALITY,
            SensorKind::Occupancy => &MappingConfig::OCCUPANCY,
        }
    }

    /// Scores a reading; occupancy assumes the default room capacity.
    pub fn score(&self, value: f64) -> f64 {
        match self {
            SensorKind::Occupancy => map_occupancy(value, DEFAULT_ROOM_CAPACITY),
            other => other.config().score(value),
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SensorKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == key)
            .ok_or_else(|| ValidationError::UnknownSensor {
                sensor: s.to_string(),
            })
    }
}

/// Resolves a free-form sensor name to its registered mapping.
pub fn mapping_for(sensor: &str) -> Result<SensorKind, ValidationError> {
    sensor.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // Centered Range Tests

    #[test]
    fn temperature_in_optimal_band_is_perfect() {
        assert_eq!(map_temperature(22.0), 1.0);
        assert_eq!(map_temperature(20.0), 1.0);
        assert_eq!(map_temperature(24.0), 1.0);
    }

    #[test]
    fn temperature_ramps_between_acceptable_and_optimal() {
        assert!(approx(map_temperature(19.0), 0.75));
        assert!(approx(map_temperature(25.0), 0.75));
        assert!(approx(map_temperature(18.0), 0.5));
        assert!(approx(map_temperature(26.0), 0.5));
    }

    #[test]
    fn temperature_far_outside_band_scores_low() {
        assert!(map_temperature(15.0) < 0.3);
        assert!(approx(map_temperature(15.0), 0.125));
        assert_eq!(map_temperature(30.0), 0.0);
        assert_eq!(map_temperature(-40.0), 0.0);
    }

    #[test]
    fn humidity_and_light_use_centered_bands() {
        assert_eq!(map_humidity(50.0), 1.0);
        assert!(approx(map_humidity(35.0), 0.75));
        assert_eq!(map_light(450.0), 1.0);
        assert!(approx(map_light(250.0), 0.75));
        assert!(map_light(280.0) < 1.0);
    }

    // Lower Is Better Tests

    #[test]
    fn co2_mapping_matches_reference_points() {
        assert_eq!(map_co2(400.0), 1.0);
        assert_eq!(map_co2(600.0), 1.0);
        assert!(approx(map_co2(800.0), 0.75));
        assert!(approx(map_co2(1000.0), 0.5));
        assert!(approx(map_co2(1500.0), 0.25));
        assert!(map_co2(2000.0) < 0.3);
        assert_eq!(map_co2(2000.0), 0.0);
    }

    #[test]
    fn non_positive_readings_are_perfect() {
        assert_eq!(map_noise(0.0), 1.0);
        assert_eq!(map_voc(-5.0), 1.0);
    }

    #[test]
    fn noise_voc_and_aqi_decrease_monotonically() {
        let mut previous = 1.0;
        for db in [30.0, 36.0, 40.0, 45.0, 60.0, 90.0] {
            let score = map_noise(db);
            assert!(score <= previous);
            previous = score;
        }
        assert!(approx(map_voc(300.0), 0.75));
        assert!(approx(map_air_quality(75.0), 0.75));
    }

    // Occupancy Tests

    #[test]
    fn occupancy_bands() {
        assert_eq!(map_occupancy(0.0, 30), 1.0);
        assert!(approx(map_occupancy(9.9, 30), 0.8));
        assert!(map_occupancy(15.0, 30) > 0.5 && map_occupancy(15.0, 30) < 0.8);
        assert!(approx(map_occupancy(30.0, 30), 0.2));
        assert_eq!(map_occupancy(45.0, 30), 0.0);
        assert_eq!(map_occupancy(100.0, 30), 0.0);
    }

    #[test]
    fn occupancy_zero_capacity_falls_back() {
        assert_eq!(map_occupancy(15.0, 0), map_occupancy(15.0, 30));
    }

    // Facility Tests

    #[test]
    fn seating_reference_points() {
        assert_eq!(map_seating_capacity(30, 30), 1.0);
        assert_eq!(map_seating_capacity(10, 30), 0.0);
        assert_eq!(map_seating_capacity(50, 0), 1.0);
        assert_eq!(map_seating_capacity(0, 0), 0.5);
    }

    #[test]
    fn seating_ramp_and_oversize_penalty() {
        assert!(approx(map_seating_capacity(15, 30), 0.5));
        assert!(approx(map_seating_capacity(20, 30), 0.5 + (2.0 / 3.0 - 0.5) * (0.5 / 0.3)));
        assert_eq!(map_seating_capacity(45, 30), 1.0);
        assert!(approx(map_seating_capacity(60, 30), 0.95));
        assert_eq!(map_seating_capacity(1000, 10), 0.5);
    }

    #[test]
    fn equipment_scores() {
        assert_eq!(map_equipment(0, 0), 1.0);
        assert_eq!(map_equipment(25, 0), 1.0);
        assert_eq!(map_equipment(0, 10), 0.0);
        assert!(approx(map_equipment(5, 10), 0.5));
        assert_eq!(map_equipment(30, 10), 1.0);
    }

    #[test]
    fn av_scores() {
        assert_eq!(map_av_facilities(false, true), 0.0);
        assert_eq!(map_av_facilities(true, true), 1.0);
        assert_eq!(map_av_facilities(true, false), 1.0);
        assert_eq!(map_av_facilities(false, false), 0.8);
    }

    #[test]
    fn policy_constants_are_configurable() {
        let policy = ScoringPolicy {
            av_unrequested_absent_score: 1.0,
            seating_oversize_ratio: 3.0,
            ..ScoringPolicy::default()
        };
        assert_eq!(policy.av_score(false, false), 1.0);
        assert_eq!(policy.seating_score(80, 30), 1.0);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn policy_rejects_inverted_seating_bands() {
        let policy = ScoringPolicy {
            seating_min_ratio: 0.9,
            ..ScoringPolicy::default()
        };
        assert!(policy.validate().is_err());

        let policy = ScoringPolicy {
            missing_value_score: 1.5,
            ..ScoringPolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn policy_deserializes_with_defaults() {
        let policy: ScoringPolicy =
            serde_json::from_str(r#"{"av_unrequested_absent_score": 0.6}"#).unwrap();
        assert_eq!(policy.av_unrequested_absent_score, 0.6);
        assert_eq!(policy.seating_full_ratio, 0.8);
    }

    #[test]
    fn missing_measurement_is_neutral() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.score_or_missing(None, map_temperature), 0.5);
        assert_eq!(policy.score_or_missing(Some(22.0), map_temperature), 1.0);
    }

    // Registry Tests

    #[test]
    fn mapping_for_normalizes_names() {
        assert_eq!(mapping_for("Air Quality").unwrap(), SensorKind::AirQuality);
        assert_eq!(mapping_for("air-quality").unwrap(), SensorKind::AirQuality);
        assert_eq!(mapping_for("CO2").unwrap(), SensorKind::Co2);
        assert_eq!(mapping_for("co2").unwrap().score(400.0), 1.0);
    }

    #[test]
    fn mapping_for_rejects_unknown_sensor() {
        assert_eq!(
            mapping_for("radon").unwrap_err(),
            ValidationError::UnknownSensor {
                sensor: "radon".to_string()
            }
        );
    }
}
