//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the reconciliation rules for the greenhouse twin:
//! telemetry gating, plant lifecycle updates, deferred refreshes and the
//! action sequencer. All interaction with the host, the clock and
//! configuration storage happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without a host attached.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
