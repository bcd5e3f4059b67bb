//! Ingest channel between the reader thread and the tick loop.
//!
//! A bounded `embassy-sync` channel carries complete input lines from the
//! blocking reader to the synchronous tick loop without heap allocation.
//!
//! ```text
//! ┌───────────────┐  IngestMsg  ┌──────────────┐
//! │ Reader thread │────────────▶│  Tick loop   │
//! │  (blocking)   │             │  (sync)      │
//! └───────────────┘             └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;

use crate::app::commands::AppCommand;

/// Largest telemetry document accepted on one line.
pub const MAX_DOCUMENT: usize = 16 * 1024;

/// Largest entity name accepted in a pick line.
pub const MAX_ENTITY_NAME: usize = 64;

/// Channel depth for inbound messages.
const INGEST_DEPTH: usize = 4;

/// One decoded input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestMsg {
    Telemetry(String<MAX_DOCUMENT>),
    Picked(String<MAX_ENTITY_NAME>),
}

impl From<IngestMsg> for AppCommand {
    fn from(msg: IngestMsg) -> Self {
        match msg {
            IngestMsg::Telemetry(doc) => Self::Telemetry(doc.as_str().to_owned()),
            IngestMsg::Picked(name) => Self::EntityPicked(name.as_str().to_owned()),
        }
    }
}

/// Inbound channel: reader thread → tick loop.
pub static INGEST_CHANNEL: Channel<CriticalSectionRawMutex, IngestMsg, INGEST_DEPTH> =
    Channel::new();

/// Non-blocking receive for the tick loop.
pub fn try_receive() -> Option<IngestMsg> {
    INGEST_CHANNEL.try_receive().ok()
}
