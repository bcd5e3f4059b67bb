//! Blocking line reader feeding the ingest channel.
//!
//! Input is line-oriented: each line is either one complete telemetry
//! document or a pick notification from the rendering host.
//!
//! ```text
//! {"series":[[...],[...]]}     → IngestMsg::Telemetry
//! pick 12                      → IngestMsg::Picked("12")
//! ```
//!
//! The reader applies backpressure: when the channel is full it waits for
//! the tick loop instead of dropping deliveries, so ordering is preserved.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use heapless::String;
use log::{info, warn};

use super::channels::{INGEST_CHANNEL, IngestMsg};

const PICK_PREFIX: &str = "pick ";

/// Backoff while the channel is full.
const FULL_BACKOFF: Duration = Duration::from_millis(5);

/// Set once the input stream is exhausted.
static INPUT_CLOSED: AtomicBool = AtomicBool::new(false);

pub fn input_closed() -> bool {
    INPUT_CLOSED.load(Ordering::Acquire)
}

/// Classify one input line. Blank and oversized lines yield `None`.
pub fn parse_line(line: &str) -> Option<IngestMsg> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(name) = line.strip_prefix(PICK_PREFIX) {
        let mut buf = String::new();
        if buf.push_str(name.trim()).is_err() {
            warn!("Ingest: entity name too long ({} bytes)", name.len());
            return None;
        }
        return Some(IngestMsg::Picked(buf));
    }

    let mut doc = String::new();
    if doc.push_str(line).is_err() {
        warn!("Ingest: document too large ({} bytes), dropped", line.len());
        return None;
    }
    Some(IngestMsg::Telemetry(doc))
}

/// Forward every line of `input` into the ingest channel, blocking while it is full.
pub fn pump(input: impl BufRead) -> usize {
    let mut forwarded = 0;
    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!("Ingest: read failed: {}", e);
                break;
            }
        };
        let Some(mut msg) = parse_line(&line) else {
            continue;
        };
        loop {
            match INGEST_CHANNEL.try_send(msg) {
                Ok(()) => break,
                Err(embassy_sync::channel::TrySendError::Full(back)) => {
                    msg = back;
                    thread::sleep(FULL_BACKOFF);
                }
            }
        }
        forwarded += 1;
    }
    forwarded
}

/// Spawn the stdin reader thread.
pub fn spawn_stdin_reader() -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("ingest".into())
        .spawn(|| {
            let stdin = std::io::stdin();
            let forwarded = pump(stdin.lock());
            info!("Ingest: input closed after {} messages", forwarded);
            INPUT_CLOSED.store(true, Ordering::Release);
        })
}
