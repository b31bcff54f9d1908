//! Criterion hierarchy for room selection.
//!
//! The hierarchy is static: one root split into three main criteria, each
//! owning a fixed, ordered set of leaf criteria. Leaf identifiers are
//! globally unique and double as the keys used in weight and score maps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Key under which the main-criteria matrix is tracked in consistency maps.
pub const MAIN_MATRIX_KEY: &str = "main";

/// The three main criteria directly below the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MainCriterion {
    Comfort,
    Health,
    Usability,
}

impl MainCriterion {
    /// Returns all main criteria in canonical order.
    pub fn all() -> &'static [MainCriterion] {
        &[
            MainCriterion::Comfort,
            MainCriterion::Health,
            MainCriterion::Usability,
        ]
    }

    /// Returns the criterion identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            MainCriterion::Comfort => "Comfort",
            MainCriterion::Health => "Health",
            MainCriterion::Usability => "Usability",
        }
    }

    /// Returns the leaves owned by this criterion, in matrix order.
    pub fn leaves(&self) -> &'static [LeafCriterion] {
        match self {
            MainCriterion::Comfort => &[
                LeafCriterion::Temperature,
                LeafCriterion::Lighting,
                LeafCriterion::Noise,
                LeafCriterion::Humidity,
            ],
            MainCriterion::Health => &[
                LeafCriterion::Co2,
                LeafCriterion::AirQuality,
                LeafCriterion::Voc,
            ],
            MainCriterion::Usability => &[
                LeafCriterion::SeatingCapacity,
                LeafCriterion::Equipment,
                LeafCriterion::AvFacilities,
            ],
        }
    }

    /// Returns the leaf identifiers owned by this criterion.
    pub fn leaf_names(&self) -> Vec<&'static str> {
        self.leaves().iter().map(LeafCriterion::as_str).collect()
    }

    /// Returns the identifiers of all main criteria.
    pub fn names() -> Vec<&'static str> {
        Self::all().iter().map(MainCriterion::as_str).collect()
    }
}

impl fmt::Display for MainCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MainCriterion {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::unknown_criterion(s))
    }
}

/// Bottom-level decision factors that receive a directly computed score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeafCriterion {
    Temperature,
    Lighting,
    Noise,
    Humidity,
    #[serde(rename = "CO2")]
    Co2,
    AirQuality,
    #[serde(rename = "VOC")]
    Voc,
    SeatingCapacity,
    Equipment,
    #[serde(rename = "AVFacilities")]
    AvFacilities,
}

impl LeafCriterion {
    /// Returns all leaves in hierarchy order.
    pub fn all() -> &'static [LeafCriterion] {
        &[
            LeafCriterion::Temperature,
            LeafCriterion::Lighting,
            LeafCriterion::Noise,
            LeafCriterion::Humidity,
            LeafCriterion::Co2,
            LeafCriterion::AirQuality,
            LeafCriterion::Voc,
            LeafCriterion::SeatingCapacity,
            LeafCriterion::Equipment,
            LeafCriterion::AvFacilities,
        ]
    }

    /// Returns the globally unique leaf identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeafCriterion::Temperature => "Temperature",
            LeafCriterion::Lighting => "Lighting",
            LeafCriterion::Noise => "Noise",
            LeafCriterion::Humidity => "Humidity",
            LeafCriterion::Co2 => "CO2",
            LeafCriterion::AirQuality => "AirQuality",
            LeafCriterion::Voc => "VOC",
            LeafCriterion::SeatingCapacity => "SeatingCapacity",
            LeafCriterion::Equipment => "Equipment",
            LeafCriterion::AvFacilities => "AVFacilities",
        }
    }

    /// Returns a human-readable name for reports.
    pub fn label(&self) -> &'static str {
        match self {
            LeafCriterion::AirQuality => "Air Quality",
            LeafCriterion::SeatingCapacity => "Seating Capacity",
            LeafCriterion::AvFacilities => "A/V Facilities",
            other => other.as_str(),
        }
    }

    /// Returns the main criterion this leaf belongs to.
    pub fn parent(&self) -> MainCriterion {
        match self {
            LeafCriterion::Temperature
            | LeafCriterion::Lighting
            | LeafCriterion::Noise
            | LeafCriterion::Humidity => MainCriterion::Comfort,
            LeafCriterion::Co2 | LeafCriterion::AirQuality | LeafCriterion::Voc => {
                MainCriterion::Health
            }
            LeafCriterion::SeatingCapacity
            | LeafCriterion::Equipment
            | LeafCriterion::AvFacilities => MainCriterion::Usability,
        }
    }

    /// Returns true for leaves scored from continuous sensor readings.
    pub fn is_sensor_backed(&self) -> bool {
        self.parent() != MainCriterion::Usability
    }
}

impl fmt::Display for LeafCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LeafCriterion {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::unknown_criterion(s))
    }
}
