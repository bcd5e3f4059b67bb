//! Unified error types for the greenhouse twin.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! ingestion boundary's error handling uniform. All variants are `Copy` so
//! they can be passed through the sequencer and event sinks without
//! allocation.
//!
//! Nothing here is fatal to the process: every variant is handled at the
//! telemetry ingestion boundary and ends up in a log line or an event.

use core::fmt;

use chrono::{DateTime, Utc};

use crate::fsm::StateId;
use crate::telemetry::record::PlantId;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The payload is not one of the two known telemetry shapes.
    WireFormat(WireFormatError),
    /// A single field could not be decoded.
    Decode(DecodeError),
    /// The sequencer refused a robot command.
    Rejected(Rejection),
    /// An outbound report could not be delivered to the host.
    Host(HostError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WireFormat(e) => write!(f, "wire format: {e}"),
            Self::Decode(e) => write!(f, "decode: {e}"),
            Self::Rejected(e) => write!(f, "rejected: {e}"),
            Self::Host(e) => write!(f, "host: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Wire format errors
// ---------------------------------------------------------------------------

/// The delivery as a whole could not be decoded. Prior state is retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormatError {
    /// Empty or whitespace-only payload.
    Empty,
    /// The (normalized) payload does not match the canonical structure.
    Shape { line: usize, column: usize },
}

impl fmt::Display for WireFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty payload"),
            Self::Shape { line, column } => {
                write!(f, "unrecognized payload shape at {line}:{column}")
            }
        }
    }
}

impl From<WireFormatError> for Error {
    fn from(e: WireFormatError) -> Self {
        Self::WireFormat(e)
    }
}

// ---------------------------------------------------------------------------
// Field decode errors
// ---------------------------------------------------------------------------

/// A single field inside an otherwise well-formed delivery was unusable.
///
/// Plant-scoped variants drop one plant; command-scoped variants drop the
/// robot command. See [`DecodeError::is_command_scoped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// `plant_id` is not an integer.
    MalformedPlantId,
    /// `age` is neither a null marker nor a parseable timestamp.
    MalformedAge(PlantId),
    /// A plant id lies outside the registry capacity.
    IdOutOfRange(i64),
    /// Robot `position` names a plant id outside the registry capacity.
    TargetOutOfRange(i64),
    /// Robot `time` is not an integer millisecond epoch offset.
    MalformedTimestamp,
    /// Robot `position` is not an integer.
    MalformedPosition,
}

impl DecodeError {
    /// `true` when this error invalidates the robot command rather than a
    /// single plant record.
    pub const fn is_command_scoped(self) -> bool {
        matches!(
            self,
            Self::MalformedTimestamp | Self::MalformedPosition | Self::TargetOutOfRange(_)
        )
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedPlantId => write!(f, "malformed plant id"),
            Self::MalformedAge(id) => write!(f, "malformed age for plant {id}"),
            Self::IdOutOfRange(id) => write!(f, "plant id {id} out of range"),
            Self::TargetOutOfRange(id) => write!(f, "command target {id} out of range"),
            Self::MalformedTimestamp => write!(f, "malformed command timestamp"),
            Self::MalformedPosition => write!(f, "malformed command position"),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Sequencer rejections
// ---------------------------------------------------------------------------

/// Reasons the action sequencer refuses a robot command.
///
/// Neither is an error in the operational sense: stale commands are the
/// expected outcome of repeated snapshot delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Timestamp not newer than the last accepted command.
    Stale {
        timestamp: DateTime<Utc>,
        last_accepted: DateTime<Utc>,
    },
    /// A command is already in flight.
    Busy {
        phase: StateId,
        in_flight_target: PlantId,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stale {
                timestamp,
                last_accepted,
            } => write!(
                f,
                "stale command at {} (last accepted {})",
                timestamp.timestamp_millis(),
                last_accepted.timestamp_millis()
            ),
            Self::Busy {
                phase,
                in_flight_target,
            } => write!(
                f,
                "sequencer busy ({phase:?} toward plant {in_flight_target})"
            ),
        }
    }
}

impl From<Rejection> for Error {
    fn from(e: Rejection) -> Self {
        Self::Rejected(e)
    }
}

// ---------------------------------------------------------------------------
// Host delivery errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostError {
    /// No host is attached (e.g. non-browser execution context).
    Unavailable,
    /// The host channel failed mid-write.
    Io,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "host unavailable"),
            Self::Io => write!(f, "host I/O failure"),
        }
    }
}

impl From<HostError> for Error {
    fn from(e: HostError) -> Self {
        Self::Host(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from [`ConfigPort`](crate::app::ports::ConfigPort) operations and
/// [`TwinConfig::validate`](crate::config::TwinConfig::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found at the given location.
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
