//! Vehicle data model
//!
//! Mirrors the blocks returned by the vehicle API. Every field the API may
//! omit is an `Option<T>`, and keys we do not model are kept in `extras`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Vehicle record from the vehicle list, used to construct devices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleData {
    /// Id used for all API calls about this vehicle
    pub id: u64,

    /// Id used by the streaming API
    pub vehicle_id: u64,

    pub vin: String,

    /// Name the owner gave the car, if any
    #[serde(default)]
    pub display_name: Option<String>,

    /// "online", "asleep" or "offline"
    #[serde(default)]
    pub state: Option<String>,

    #[serde(flatten)]
    pub extras: HashMap<String, Value>,
}

impl VehicleData {
    pub fn new(id: u64, vehicle_id: u64, vin: impl Into<String>) -> Self {
        Self {
            id,
            vehicle_id,
            vin: vin.into(),
            display_name: None,
            state: None,
            extras: HashMap::new(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Cached `drive_state` block
///
/// Decoded through a JSON object so that the keys the API sent are known,
/// including those whose value was null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct DriveParams {
    /// Raw shift state token ("P", "D", "R", "N")
    pub shift_state: Option<String>,

    /// Speed in mph
    pub speed: Option<f64>,

    /// Power draw in kW (negative while regenerating)
    pub power: Option<f64>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    /// Heading in degrees
    pub heading: Option<f64>,

    /// Unix seconds of the last GPS fix
    pub gps_as_of: Option<i64>,

    /// Unix milliseconds when the block was produced
    pub timestamp: Option<i64>,

    #[serde(flatten)]
    pub extras: HashMap<String, Value>,

    /// Keys present in the decoded block, null-valued ones included
    #[serde(skip)]
    pub present_keys: BTreeSet<String>,
}

impl DriveParams {
    /// Record carrying a `shift_state` key and nothing else
    pub fn with_shift_state(shift_state: Option<&str>) -> Self {
        Self {
            shift_state: shift_state.map(str::to_string),
            present_keys: BTreeSet::from(["shift_state".to_string()]),
            ..Self::default()
        }
    }

    /// True when the block carries no keys at all
    pub fn is_empty(&self) -> bool {
        self.present_keys.is_empty()
            && self.shift_state.is_none()
            && self.speed.is_none()
            && self.power.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.heading.is_none()
            && self.gps_as_of.is_none()
            && self.timestamp.is_none()
            && self.extras.is_empty()
    }
}

/// Remove `key` and decode it; missing and null both give `None`
fn take<T: DeserializeOwned>(
    map: &mut Map<String, Value>,
    key: &str,
) -> serde_json::Result<Option<T>> {
    match map.remove(key) {
        Some(value) => serde_json::from_value(value),
        None => Ok(None),
    }
}

impl TryFrom<Map<String, Value>> for DriveParams {
    type Error = serde_json::Error;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        let present_keys = map.keys().cloned().collect();

        Ok(Self {
            shift_state: take(&mut map, "shift_state")?,
            speed: take(&mut map, "speed")?,
            power: take(&mut map, "power")?,
            latitude: take(&mut map, "latitude")?,
            longitude: take(&mut map, "longitude")?,
            heading: take(&mut map, "heading")?,
            gps_as_of: take(&mut map, "gps_as_of")?,
            timestamp: take(&mut map, "timestamp")?,
            extras: map.into_iter().collect(),
            present_keys,
        })
    }
}

/// Cached `vehicle_state` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateParams {
    /// Firmware version string
    #[serde(default)]
    pub car_version: Option<String>,

    #[serde(default)]
    pub sentry_mode_available: Option<bool>,

    #[serde(flatten)]
    pub extras: HashMap<String, Value>,
}

/// Transmission position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftState {
    #[serde(rename = "P")]
    Park,
    #[serde(rename = "D")]
    Drive,
    #[serde(rename = "R")]
    Reverse,
    #[serde(rename = "N")]
    Neutral,
}

impl ShiftState {
    /// Token used by the vehicle API
    pub fn as_token(&self) -> &'static str {
        match self {
            ShiftState::Park => "P",
            ShiftState::Drive => "D",
            ShiftState::Reverse => "R",
            ShiftState::Neutral => "N",
        }
    }
}

impl fmt::Display for ShiftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Token that is not one of P, D, R, N
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown shift state token: {0:?}")]
pub struct UnknownShiftState(pub String);

impl FromStr for ShiftState {
    type Err = UnknownShiftState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P" => Ok(ShiftState::Park),
            "D" => Ok(ShiftState::Drive),
            "R" => Ok(ShiftState::Reverse),
            "N" => Ok(ShiftState::Neutral),
            other => Err(UnknownShiftState(other.to_string())),
        }
    }
}
