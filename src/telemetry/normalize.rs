//! Wire normalizer.
//!
//! The dashboard feed emits one of two nested-array layouts depending on
//! which query section comes first:
//!
//! ```text
//!   plants first:  {"series":[[ {plant}, {plant}, ... ], [ {robot} ]]}
//!   robot first:   {"series":[[ {robot} ], [ {plant}, {plant}, ... ]]}
//!                                   │
//!                                   ▼
//!   canonical:     {"robot":{robot},"series":[ {plant}, ... ]}
//! ```
//!
//! Detection only looks at the first field name inside the first nested
//! array. Each layout then has its own explicit rewrite path. Anything
//! that is not one of the two layouts passes through unchanged and is
//! reported by the decoder.

use log::debug;
use serde_json::{Map, Value};

/// Field names that only occur in plant records.
const PLANT_FIELDS: [&str; 3] = ["age", "plant_id", "recommended_action"];

/// A payload in canonical form (or an unrecognized payload passed through).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalJson(String);

impl CanonicalJson {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Which section the feed emitted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionOrder {
    PlantsFirst,
    RobotFirst,
}

/// Inspect the payload prefix and report the nested layout it uses.
///
/// Returns `None` when the payload does not start with the nested
/// `{"series":[[` prefix (including payloads already in canonical form).
/// An empty first section is read as an empty plant list.
pub fn detect_order(raw: &str) -> Option<SectionOrder> {
    let mut rest = raw.trim_start();
    for token in ["{", "\"series\"", ":", "[", "["] {
        rest = rest.strip_prefix(token)?.trim_start();
    }
    if rest.starts_with(']') {
        return Some(SectionOrder::PlantsFirst);
    }

    let rest = rest.strip_prefix('{')?.trim_start();
    let rest = rest.strip_prefix('"')?;
    let field = &rest[..rest.find('"')?];

    if PLANT_FIELDS.contains(&field) {
        Some(SectionOrder::PlantsFirst)
    } else {
        Some(SectionOrder::RobotFirst)
    }
}

/// Rewrite a raw payload into canonical form. Never fails.
pub fn normalize(raw: &str) -> CanonicalJson {
    let Some(order) = detect_order(raw) else {
        return CanonicalJson(raw.to_owned());
    };

    match rewrite(raw, order) {
        Some(canonical) => CanonicalJson(canonical),
        None => {
            debug!("Normalizer: {:?} prefix but unexpected layout, passing through", order);
            CanonicalJson(raw.to_owned())
        }
    }
}

fn rewrite(raw: &str, order: SectionOrder) -> Option<String> {
    let Value::Object(mut root) = serde_json::from_str::<Value>(raw).ok()? else {
        return None;
    };
    if root.len() != 1 {
        return None;
    }
    let Value::Array(sections) = root.remove("series")? else {
        return None;
    };
    let [first, second]: [Value; 2] = sections.try_into().ok()?;

    let (plants, robot) = match order {
        SectionOrder::PlantsFirst => rewrite_plants_first(first, second)?,
        SectionOrder::RobotFirst => rewrite_robot_first(first, second)?,
    };

    let mut canonical = Map::new();
    canonical.insert("series".into(), Value::Array(plants));
    canonical.insert("robot".into(), Value::Object(robot));
    serde_json::to_string(&Value::Object(canonical)).ok()
}

/// `[[plants...], [robot]]`
fn rewrite_plants_first(first: Value, second: Value) -> Option<(Vec<Value>, Map<String, Value>)> {
    let Value::Array(plants) = first else {
        return None;
    };
    Some((plants, single_object(second)?))
}

/// `[[robot], [plants...]]`
fn rewrite_robot_first(first: Value, second: Value) -> Option<(Vec<Value>, Map<String, Value>)> {
    let robot = single_object(first)?;
    let Value::Array(plants) = second else {
        return None;
    };
    Some((plants, robot))
}

/// Unwrap a one-element array holding an object.
fn single_object(section: Value) -> Option<Map<String, Value>> {
    let Value::Array(items) = section else {
        return None;
    };
    let [item]: [Value; 1] = items.try_into().ok()?;
    match item {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
