//! Typed telemetry records produced by the decoder.

use core::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Plant identifier as addressed by the feed (1-based).
pub type PlantId = u16;

/// Actions the robot can perform or the feed can recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Water,
    Fertilize,
    Harvest,
    Monitor,
    Seed,
    /// Any string outside the known set.
    Unknown,
}

impl ActionKind {
    pub const KNOWN: [ActionKind; 5] = [
        Self::Water,
        Self::Fertilize,
        Self::Harvest,
        Self::Monitor,
        Self::Seed,
    ];

    /// Match a feed string, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        Self::KNOWN
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(s))
            .unwrap_or(Self::Unknown)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Fertilize => "fertilize",
            Self::Harvest => "harvest",
            Self::Monitor => "monitor",
            Self::Seed => "seed",
            Self::Unknown => "unknown",
        }
    }

    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One plant slot as reported by a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantRecord {
    pub id: PlantId,
    /// `None` marks an empty slot.
    pub age: Option<Duration>,
    pub recommended_action: Option<ActionKind>,
}

/// The single robot instruction carried by a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RobotCommand {
    pub timestamp: DateTime<Utc>,
    pub action: ActionKind,
    pub target_plant_id: PlantId,
}
