//! Host bridge adapter.
//!
//! Implements [`HostPort`] by writing one JSON object per line to any
//! [`Write`] target (stdout in the binary, a `Vec<u8>` under test):
//!
//! ```text
//! {"call":"reportManipulatorOffset","value":"(1.30, -0.50, 0.00)"}
//! {"call":"reportClickedEntity","value":"12"}
//! ```
//!
//! A closed pipe maps to [`HostError::Unavailable`]; any other write
//! failure to [`HostError::Io`].

use std::io::{self, Write};

use log::debug;
use serde::Serialize;

use crate::app::ports::HostPort;
use crate::error::HostError;

#[derive(Serialize)]
struct HostCall<'a> {
    call: &'static str,
    value: &'a str,
}

/// JSON-lines bridge to the rendering host.
pub struct JsonLinesHost<W: Write> {
    out: W,
    sent: u64,
}

impl JsonLinesHost<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonLinesHost<W> {
    pub fn new(out: W) -> Self {
        Self { out, sent: 0 }
    }

    /// Number of calls written so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn send(&mut self, call: &'static str, value: &str) -> Result<(), HostError> {
        let mut line =
            serde_json::to_string(&HostCall { call, value }).map_err(|_| HostError::Io)?;
        line.push('\n');
        self.out
            .write_all(line.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|e| map_io_kind(e.kind()))?;

        self.sent += 1;
        debug!("Host: {} {}", call, value);
        Ok(())
    }
}

fn map_io_kind(kind: io::ErrorKind) -> HostError {
    match kind {
        io::ErrorKind::BrokenPipe | io::ErrorKind::NotConnected => HostError::Unavailable,
        _ => HostError::Io,
    }
}

impl<W: Write> HostPort for JsonLinesHost<W> {
    fn report_manipulator_offset(&mut self, offset: &str) -> Result<(), HostError> {
        self.send("reportManipulatorOffset", offset)
    }

    fn report_clicked_entity(&mut self, id: &str) -> Result<(), HostError> {
        self.send("reportClickedEntity", id)
    }
}

/// Host stand-in for headless runs: every call fails as unavailable.
#[derive(Debug, Default)]
pub struct DetachedHost;

impl HostPort for DetachedHost {
    fn report_manipulator_offset(&mut self, _offset: &str) -> Result<(), HostError> {
        Err(HostError::Unavailable)
    }

    fn report_clicked_entity(&mut self, _id: &str) -> Result<(), HostError> {
        Err(HostError::Unavailable)
    }
}
