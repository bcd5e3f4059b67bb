//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one structured line per
//! application event to the `log` facade. A scene-graph driver would
//! implement the same trait.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::lifecycle::PlantChangeEvent;

/// Adapter that logs every [`AppEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_phase={:?}", state);
            }
            AppEvent::PlantReplaced(PlantChangeEvent::Replace {
                id,
                stage,
                previous,
                displayed_action,
                placement,
            }) => {
                info!(
                    "PLANT | id={} | {:?} -> {:?} | row={} col={} | icon={}",
                    id,
                    previous,
                    stage,
                    placement.row,
                    placement.column,
                    displayed_action.map_or("none", |a| a.label()),
                );
            }
            AppEvent::PlantDropped(e) => {
                warn!("PLANT | dropped: {}", e);
            }
            AppEvent::PlantRefreshDeferred { plants, delay_secs } => {
                info!("PLANT | {} records deferred {:.1}s", plants, delay_secs);
            }
            AppEvent::CommandDropped(e) => {
                warn!("ROBOT | command dropped: {}", e);
            }
            AppEvent::DeliveryFailed(e) => {
                warn!("FEED  | delivery discarded: {}", e);
            }
            AppEvent::CommandAccepted(cmd) => {
                info!(
                    "ROBOT | accepted {} on plant {} @ {}",
                    cmd.action,
                    cmd.target_plant_id,
                    cmd.timestamp.timestamp_millis(),
                );
            }
            AppEvent::CommandRejected(reason) => {
                info!("ROBOT | rejected: {}", reason);
            }
            AppEvent::PhaseChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::RobotMoved(position) => {
                debug!("ROBOT | at {}", position);
            }
            AppEvent::IndicatorChanged(indicator) => {
                info!(
                    "ROBOT | indicator={}",
                    indicator.map_or("hidden", |a| a.label())
                );
            }
            AppEvent::ArmSettled(offset) => {
                info!("ARM   | settled, offset={}", offset);
            }
            AppEvent::HostUnavailable(e) => {
                warn!("HOST  | {}", e);
            }
        }
    }
}
