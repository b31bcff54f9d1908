//! Candidate rooms and user requirements.
//!
//! A [`RoomData`] is a single materialized snapshot of a room: optional
//! sensor readings plus facility attributes. Upstream collaborators deliver
//! rooms in several JSON shapes; [`RoomData::from_value`] normalizes them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::ValidationError;

/// Snapshot of one candidate room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomData {
    pub room_id: String,
    pub room_name: String,

    // Sensor readings, any of which may be absent.
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub co2: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub light: Option<f64>,
    #[serde(default)]
    pub noise: Option<f64>,
    #[serde(default)]
    pub voc: Option<f64>,
    #[serde(default)]
    pub air_quality: Option<f64>,

    #[serde(default)]
    pub seating_capacity: u32,
    #[serde(default)]
    pub has_projector: bool,
    #[serde(default)]
    pub computers: u32,
    #[serde(default)]
    pub has_robots: bool,
    #[serde(default)]
    pub training_robots: u32,

    /// Calendar availability for the requested slot.
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl RoomData {
    /// Creates a room with no readings and no facilities.
    pub fn new(room_id: impl Into<String>, room_name: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            room_name: room_name.into(),
            temperature: None,
            co2: None,
            humidity: None,
            light: None,
            noise: None,
            voc: None,
            air_quality: None,
            seating_capacity: 0,
            has_projector: false,
            computers: 0,
            has_robots: false,
            training_robots: 0,
            is_available: true,
        }
    }

    /// Builds a room from a loosely-shaped JSON record.
    ///
    /// The identifier comes from `id`, `room_id` or `name` (first present
    /// wins) and the display name from `name`, `room_id` or `id`. Facility
    /// fields are read top-level first, then from a nested `facilities`
    /// object (`videoprojector`, `seating_capacity`, `computers`,
    /// `robots_for_training`). A top-level key that is present, even as
    /// `null`, is used as-is and never defers to the nested value.
    ///
    /// # Errors
    /// - `InvalidFormat` if the record is not a JSON object
    /// - `EmptyField` if no identifier field is present
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let record = value
            .as_object()
            .ok_or_else(|| ValidationError::invalid_format("room", "expected a JSON object"))?;
        let empty = Map::new();
        let facilities = record
            .get("facilities")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let room_id = first_text(record, &["id", "room_id", "name"])
            .ok_or_else(|| ValidationError::empty_field("id"))?;
        let room_name = first_text(record, &["name", "room_id", "id"]).unwrap_or_else(|| room_id.clone());

        let training_robots = count(record, facilities, "robots_for_training", "robots_for_training");
        let has_robots = record
            .get("has_robots")
            .and_then(as_flag)
            .unwrap_or(training_robots > 0);

        Ok(Self {
            room_id,
            room_name,
            temperature: number(record, "temperature"),
            co2: number(record, "co2"),
            humidity: number(record, "humidity"),
            light: number(record, "light"),
            noise: number(record, "noise").or_else(|| number(record, "sound")),
            voc: number(record, "voc"),
            air_quality: number(record, "air_quality"),
            seating_capacity: count(record, facilities, "seating_capacity", "seating_capacity"),
            has_projector: flag(record, facilities, "has_projector", "videoprojector"),
            computers: count(record, facilities, "computers", "computers"),
            has_robots,
            training_robots,
            is_available: record
                .get("is_available")
                .and_then(as_flag)
                .unwrap_or(true),
        })
    }

    /// Returns true if the room has at least one reading.
    pub fn has_sensor_data(&self) -> bool {
        [
            self.temperature,
            self.co2,
            self.humidity,
            self.light,
            self.noise,
            self.voc,
            self.air_quality,
        ]
        .iter()
        .any(Option::is_some)
    }
}

fn first_text(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match record.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn number(record: &Map<String, Value>, key: &str) -> Option<f64> {
    record.get(key).and_then(Value::as_f64)
}

fn as_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX)),
        Value::Bool(b) => Some(u32::from(*b)),
        _ => None,
    }
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        _ => None,
    }
}

/// Value for a facility field: a present top-level key wins even when it is
/// `null` or unparsable; only an absent key defers to `facilities`.
fn facility<'a>(
    top: &'a Map<String, Value>,
    nested: &'a Map<String, Value>,
    key: &str,
    nested_key: &str,
) -> Option<&'a Value> {
    top.get(key).or_else(|| nested.get(nested_key))
}

fn count(top: &Map<String, Value>, nested: &Map<String, Value>, key: &str, nested_key: &str) -> u32 {
    facility(top, nested, key, nested_key)
        .and_then(as_count)
        .unwrap_or(0)
}

fn flag(top: &Map<String, Value>, nested: &Map<String, Value>, key: &str, nested_key: &str) -> bool {
    facility(top, nested, key, nested_key)
        .and_then(as_flag)
        .unwrap_or(false)
}

/// Facility needs that parametrize the usability scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRequirements {
    #[serde(default)]
    pub required_seats: u32,
    #[serde(default)]
    pub need_projector: bool,
    #[serde(default)]
    pub need_computers: u32,
}

impl UserRequirements {
    pub fn new(required_seats: u32, need_projector: bool, need_computers: u32) -> Self {
        Self {
            required_seats,
            need_projector,
            need_computers,
        }
    }
}
