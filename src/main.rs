//! GreenTwin host entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                     │
//! │                                                               │
//! │  stdin reader ──▶ INGEST_CHANNEL     JsonConfigFile (Config)  │
//! │  LogEventSink (EventSink)            SystemClock (Clock)      │
//! │  JsonLinesHost / DetachedHost (Host)                          │
//! │                                                               │
//! │  ──────────────── Port Trait Boundary ───────────────────     │
//! │                                                               │
//! │  ┌─────────────────────────────────────────────────────────┐  │
//! │  │              TwinService (pure logic)                   │  │
//! │  │  Normalizer · Decoder · Lifecycle · Sequencer · Arm     │  │
//! │  └─────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logs go to stderr; stdout is reserved for host calls.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tracing_subscriber::EnvFilter;

use greentwin::adapters::config_file::{JsonConfigFile, load_or_default};
use greentwin::adapters::host::{DetachedHost, JsonLinesHost};
use greentwin::adapters::log_sink::LogEventSink;
use greentwin::adapters::time::{SystemClock, TickTimer};
use greentwin::app::ports::HostPort;
use greentwin::app::service::TwinService;
use greentwin::config::TwinConfig;
use greentwin::ingest;

/// Greenhouse digital twin: reads telemetry documents from stdin, one per line.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON configuration file; defaults apply when it does not exist.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the tick period in milliseconds.
    #[arg(long)]
    tick_ms: Option<u32>,

    /// Exit once input is closed and the twin has settled.
    #[arg(long)]
    exit_when_idle: bool,

    /// Do not write host calls to stdout.
    #[arg(long)]
    headless: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_or_default(&JsonConfigFile::new(path))
            .with_context(|| format!("loading {}", path.display()))?,
        None => TwinConfig::default(),
    };
    if let Some(ms) = args.tick_ms {
        config.tick_interval_ms = ms;
    }

    let service = TwinService::new(config).context("invalid configuration")?;

    if args.headless {
        run(service, DetachedHost, &args)
    } else {
        run(service, JsonLinesHost::stdout(), &args)
    }
}

fn run(mut service: TwinService, mut host: impl HostPort, args: &Args) -> Result<()> {
    let clock = SystemClock;
    let mut sink = LogEventSink::new();
    let period = Duration::from_millis(u64::from(service.config().tick_interval_ms));

    ingest::spawn_stdin_reader().context("spawning stdin reader")?;
    service.start(&mut sink);

    let mut timer = TickTimer::new();
    loop {
        // Sampled before draining so every message sent before close is seen.
        let closed = ingest::input_closed();

        while let Some(msg) = ingest::try_receive() {
            service.handle_command(msg.into(), &clock, &mut host, &mut sink);
        }
        service.tick(timer.lap_secs(), &mut host, &mut sink);

        if args.exit_when_idle && closed && service.is_idle() {
            break;
        }
        thread::sleep(period);
    }

    let status = serde_json::to_string(&service.status())?;
    info!("Final status: {}", status);
    Ok(())
}
