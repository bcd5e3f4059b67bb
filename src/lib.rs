//! GreenTwin library.
//!
//! Reconciles greenhouse telemetry into a digital twin: plant growth
//! stages, a robot action sequencer and its arm orientation. Exposes the
//! pure-logic modules for integration testing; the binary wires them to
//! stdin, stdout and the wall clock through the adapters.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod fsm;
pub mod ingest;
pub mod lifecycle;
pub mod scheduler;
pub mod telemetry;

pub use error::{Error, Result};
