//! Telemetry ingestion: wire normalization and decoding.
//!
//! ```text
//!   raw payload ──▶ normalize ──▶ CanonicalJson ──▶ decode ──▶ Snapshot
//! ```

pub mod decode;
pub mod normalize;
pub mod record;

pub use decode::{Snapshot, decode};
pub use normalize::{CanonicalJson, SectionOrder, normalize};
pub use record::{ActionKind, PlantId, PlantRecord, RobotCommand};
