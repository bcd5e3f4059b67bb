//! Telemetry ingest: a blocking reader thread and the bounded channel it
//! feeds. The tick loop drains the channel between ticks, so deliveries
//! are processed one at a time and in arrival order.

pub mod channels;
pub mod reader;

pub use channels::{IngestMsg, try_receive};
pub use reader::{input_closed, spawn_stdin_reader};
