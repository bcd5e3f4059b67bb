//! Mock adapters and payload builders for integration tests.
//!
//! Records every host call and every emitted event so tests can assert on
//! the full history without a rendering host attached.

use chrono::{DateTime, Duration, TimeZone, Utc};
use greentwin::adapters::time::FixedClock;
use greentwin::app::events::AppEvent;
use greentwin::app::ports::{EventSink, HostPort};
use greentwin::app::service::TwinService;
use greentwin::error::HostError;
use greentwin::fsm::StateId;
use serde_json::json;

// ── Host ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Offset(String),
    Clicked(String),
}

#[derive(Default)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
    /// When set, every call fails as if no host were attached.
    pub detached: bool,
}

#[allow(dead_code)]
impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detached() -> Self {
        Self {
            calls: Vec::new(),
            detached: true,
        }
    }

    pub fn offsets(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Offset(o) => Some(o.as_str()),
                HostCall::Clicked(_) => None,
            })
            .collect()
    }
}

impl HostPort for RecordingHost {
    fn report_manipulator_offset(&mut self, offset: &str) -> Result<(), HostError> {
        if self.detached {
            return Err(HostError::Unavailable);
        }
        self.calls.push(HostCall::Offset(offset.to_owned()));
        Ok(())
    }

    fn report_clicked_entity(&mut self, id: &str) -> Result<(), HostError> {
        if self.detached {
            return Err(HostError::Unavailable);
        }
        self.calls.push(HostCall::Clicked(id.to_owned()));
        Ok(())
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything recorded so far.
    pub fn take(&mut self) -> Vec<AppEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Clock ─────────────────────────────────────────────────────

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 14, 12, 0, 0).unwrap()
}

pub fn clock() -> FixedClock {
    FixedClock(now())
}

/// Planting timestamp `days` before [`now`], in the feed's naive layout.
pub fn planted_days_ago(days: i64) -> String {
    (now() - Duration::days(days))
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
}

// ── Payload builders ──────────────────────────────────────────

pub fn plant(id: u16, age: Option<&str>, action: Option<&str>) -> String {
    json!({
        "plant_id": id.to_string(),
        "age": age.unwrap_or("None"),
        "recommended_action": action,
    })
    .to_string()
}

pub fn robot(time_ms: i64, action: &str, position: u16) -> String {
    json!({ "time": time_ms, "action": action, "position": position }).to_string()
}

pub fn plants_first(plants: &[String], robot: &str) -> String {
    format!(r#"{{"series":[[{}],[{}]]}}"#, plants.join(","), robot)
}

#[allow(dead_code)]
pub fn robot_first(plants: &[String], robot: &str) -> String {
    format!(r#"{{"series":[[{}],[{}]]}}"#, robot, plants.join(","))
}

// ── Driving the service ───────────────────────────────────────

pub const STEP_SECS: f32 = 0.05;

/// Tick until `phase` is reached (bounded).
pub fn run_until(
    svc: &mut TwinService,
    host: &mut RecordingHost,
    sink: &mut RecordingSink,
    phase: StateId,
) {
    for _ in 0..20_000 {
        if svc.phase() == phase {
            return;
        }
        svc.tick(STEP_SECS, host, sink);
    }
    panic!("never reached {phase:?}");
}

/// Tick for `secs` of simulated time.
#[allow(dead_code)]
pub fn run_for(svc: &mut TwinService, host: &mut RecordingHost, sink: &mut RecordingSink, secs: f32) {
    let steps = (secs / STEP_SECS).round() as usize;
    for _ in 0..steps {
        svc.tick(STEP_SECS, host, sink);
    }
}
