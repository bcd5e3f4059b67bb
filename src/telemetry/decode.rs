//! Telemetry decoder: canonical JSON to typed records.
//!
//! Decoding is lenient per field and strict per delivery:
//!
//! - a payload that is not `{"series":[...], "robot":{...}}` is a
//!   [`WireFormatError`] and nothing is applied;
//! - a bad plant field drops that plant only;
//! - a bad robot field drops the command only.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{DecodeError, WireFormatError};

use super::normalize::CanonicalJson;
use super::record::{ActionKind, PlantId, PlantRecord, RobotCommand};

/// Literal strings the feed uses for "no value".
const NULL_MARKERS: [&str; 2] = ["null", "None"];

/// Naive timestamp layouts accepted for plant ages (read as UTC).
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

// ---------------------------------------------------------------------------
// Wire structures
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct WireSnapshot {
    series: Vec<Value>,
    #[serde(default)]
    robot: Option<Value>,
}

#[derive(Deserialize)]
struct WirePlant {
    #[serde(default)]
    plant_id: Option<WireScalar>,
    #[serde(default)]
    age: Option<WireScalar>,
    #[serde(default)]
    recommended_action: Option<WireScalar>,
}

#[derive(Deserialize)]
struct WireRobot {
    #[serde(default)]
    time: Option<WireScalar>,
    #[serde(default)]
    action: Option<WireScalar>,
    #[serde(default)]
    position: Option<WireScalar>,
}

/// The feed is loose about types: ids arrive as strings or numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireScalar {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(Value),
}

impl WireScalar {
    fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(*f as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Decoded snapshot
// ---------------------------------------------------------------------------

/// Result of decoding one delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Plants that decoded cleanly, in feed order.
    pub plants: Vec<PlantRecord>,
    /// One entry per dropped plant.
    pub rejected_plants: Vec<DecodeError>,
    /// `None` when the delivery carried no robot section.
    pub robot: Option<Result<RobotCommand, DecodeError>>,
}

/// Decode a canonical payload.
///
/// `now` anchors plant ages; `capacity` bounds plant ids and the command
/// target (`1..=capacity`).
pub fn decode(
    canonical: &CanonicalJson,
    now: DateTime<Utc>,
    capacity: u16,
) -> Result<Snapshot, WireFormatError> {
    let raw = canonical.as_str();
    if raw.trim().is_empty() {
        return Err(WireFormatError::Empty);
    }

    let wire: WireSnapshot = serde_json::from_str(raw).map_err(|e| WireFormatError::Shape {
        line: e.line(),
        column: e.column(),
    })?;

    let mut plants = Vec::with_capacity(wire.series.len());
    let mut rejected_plants = Vec::new();
    for element in wire.series {
        match decode_plant(element, now, capacity) {
            Ok(plant) => plants.push(plant),
            Err(e) => {
                warn!("Decoder: dropping plant: {}", e);
                rejected_plants.push(e);
            }
        }
    }

    let robot = wire.robot.map(|r| decode_robot(r, capacity));
    if let Some(Err(e)) = &robot {
        warn!("Decoder: dropping robot command: {}", e);
    }

    Ok(Snapshot {
        plants,
        rejected_plants,
        robot,
    })
}

// ---------------------------------------------------------------------------
// Plants
// ---------------------------------------------------------------------------

fn decode_plant(
    element: Value,
    now: DateTime<Utc>,
    capacity: u16,
) -> Result<PlantRecord, DecodeError> {
    let wire: WirePlant =
        serde_json::from_value(element).map_err(|_| DecodeError::MalformedPlantId)?;

    let raw_id = wire
        .plant_id
        .as_ref()
        .and_then(WireScalar::as_integer)
        .ok_or(DecodeError::MalformedPlantId)?;
    let id = checked_id(raw_id, capacity).ok_or(DecodeError::IdOutOfRange(raw_id))?;

    let age = match &wire.age {
        None => None,
        Some(WireScalar::Text(s)) if is_null_marker(s) => None,
        Some(WireScalar::Text(s)) => {
            let planted = parse_timestamp(s).ok_or(DecodeError::MalformedAge(id))?;
            Some((now - planted).max(Duration::zero()))
        }
        Some(_) => return Err(DecodeError::MalformedAge(id)),
    };

    let recommended_action = match &wire.recommended_action {
        None => None,
        Some(WireScalar::Text(s)) if is_null_marker(s) || s.trim().is_empty() => None,
        Some(other) => Some(decode_action(other, "recommended_action")),
    };

    Ok(PlantRecord {
        id,
        age,
        recommended_action,
    })
}

/// Parse an absolute planting timestamp.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Robot
// ---------------------------------------------------------------------------

fn decode_robot(section: Value, capacity: u16) -> Result<RobotCommand, DecodeError> {
    let wire: WireRobot =
        serde_json::from_value(section).map_err(|_| DecodeError::MalformedTimestamp)?;

    let timestamp = wire
        .time
        .as_ref()
        .and_then(WireScalar::as_integer)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .ok_or(DecodeError::MalformedTimestamp)?;

    let raw_target = wire
        .position
        .as_ref()
        .and_then(WireScalar::as_integer)
        .ok_or(DecodeError::MalformedPosition)?;
    let target_plant_id =
        checked_id(raw_target, capacity).ok_or(DecodeError::TargetOutOfRange(raw_target))?;

    let action = match &wire.action {
        None => ActionKind::Unknown,
        Some(WireScalar::Text(s)) if is_null_marker(s) || s.trim().is_empty() => {
            ActionKind::Unknown
        }
        Some(other) => decode_action(other, "action"),
    };

    Ok(RobotCommand {
        timestamp,
        action,
        target_plant_id,
    })
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn decode_action(raw: &WireScalar, field: &str) -> ActionKind {
    let kind = raw.as_text().map_or(ActionKind::Unknown, ActionKind::parse);
    if !kind.is_known() {
        match raw.as_text() {
            Some(s) => warn!("Decoder: unknown {} {:?}", field, s),
            None => warn!("Decoder: non-string {}", field),
        }
    }
    kind
}

fn checked_id(raw: i64, capacity: u16) -> Option<PlantId> {
    PlantId::try_from(raw)
        .ok()
        .filter(|id| (1..=capacity).contains(id))
}

fn is_null_marker(s: &str) -> bool {
    NULL_MARKERS.contains(&s.trim())
}
