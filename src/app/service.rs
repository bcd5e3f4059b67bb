//! Application service, the hexagonal core.
//!
//! [`TwinService`] owns the plant registry, the action sequencer and the
//! deferred-refresh scheduler. It exposes a host-agnostic API; every
//! interaction with the outside world flows through port traits injected
//! at call sites, so the whole service runs under test with mock adapters.
//!
//! ```text
//!  raw telemetry ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!      ClockPort ──▶ │          TwinService          │
//!                    │ Store · Sequencer · Refreshes │ ──▶ HostPort
//!                    └──────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::TwinConfig;
use crate::control::orientation::ArmRig;
use crate::control::pose::Vec3;
use crate::error::{ConfigError, DecodeError, Error, Rejection};
use crate::fsm::StateId;
use crate::fsm::sequencer::{ActionSequencer, SequencerEvent};
use crate::lifecycle::{PlantEntity, PlantLifecycleStore, StageThresholds};
use crate::scheduler::{Generation, Scheduler};
use crate::telemetry::record::{ActionKind, PlantId, PlantRecord, RobotCommand};
use crate::telemetry::{decode, normalize};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{ClockPort, EventSink, HostPort, SchedulerDelegate};

// ───────────────────────────────────────────────────────────────
// Reports
// ───────────────────────────────────────────────────────────────

/// What happened to the robot section of one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The delivery carried no robot section.
    Absent,
    Accepted(RobotCommand),
    Rejected(Rejection),
    Dropped(DecodeError),
}

/// Summary of one [`TwinService::receive`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Visual rebuilds applied right away.
    pub plant_changes: usize,
    /// Plant records held back for a deferred refresh.
    pub plants_deferred: usize,
    pub rejected_plants: usize,
    pub command: CommandOutcome,
}

/// Serializable point-in-time view of the twin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwinStatus {
    pub phase: StateId,
    pub last_accepted: Option<DateTime<Utc>>,
    pub command: Option<RobotCommand>,
    pub indicator: Option<ActionKind>,
    pub robot_position: Vec3,
    pub plant_count: usize,
    pub pending_refreshes: usize,
}

// ───────────────────────────────────────────────────────────────
// Deferred refresh delegate
// ───────────────────────────────────────────────────────────────

/// Collects plant batches whose refresh came due this tick.
#[derive(Default)]
struct RefreshCollector {
    due: Vec<Vec<PlantRecord>>,
}

impl SchedulerDelegate<Vec<PlantRecord>> for RefreshCollector {
    fn on_fired(&mut self, label: &'static str, task: Vec<PlantRecord>) {
        debug!("Service: {} due ({} plants)", label, task.len());
        self.due.push(task);
    }
}

// ───────────────────────────────────────────────────────────────
// TwinService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct TwinService {
    config: TwinConfig,
    store: PlantLifecycleStore,
    sequencer: ActionSequencer,
    refreshes: Scheduler<Vec<PlantRecord>>,
    /// Bumped on every plant application or deferral, except a redelivery
    /// of the deferred snapshot.
    snapshot_epoch: Generation,
    deliveries: u64,
}

impl TwinService {
    /// Construct the service with the default arm rig.
    ///
    /// Fails if the configuration does not validate.
    pub fn new(config: TwinConfig) -> Result<Self, ConfigError> {
        Self::with_rig(config, ArmRig::default())
    }

    pub fn with_rig(config: TwinConfig, rig: ArmRig) -> Result<Self, ConfigError> {
        config.validate()?;
        let thresholds = StageThresholds::from_config(&config)?;
        let sequencer = ActionSequencer::new(&config, rig);

        Ok(Self {
            store: PlantLifecycleStore::new(thresholds),
            sequencer,
            refreshes: Scheduler::new(),
            snapshot_epoch: 0,
            deliveries: 0,
            config,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        let phase = self.sequencer.phase();
        sink.emit(&AppEvent::Started(phase));
        info!("TwinService started in {:?}", phase);
    }

    // ── Telemetry ingestion ───────────────────────────────────

    /// Reconcile one telemetry delivery.
    ///
    /// Only a delivery that cannot be decoded at all is an `Err`; prior
    /// state is kept untouched in that case. Partial failures are carried
    /// in the [`DeliveryReport`] and emitted as events.
    pub fn receive(
        &mut self,
        raw: &str,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> Result<DeliveryReport, Error> {
        self.deliveries += 1;

        let canonical = normalize(raw);
        let snapshot = match decode(&canonical, clock.now(), self.config.plant_capacity) {
            Ok(s) => s,
            Err(e) => {
                warn!("Service: delivery {} discarded: {}", self.deliveries, e);
                sink.emit(&AppEvent::DeliveryFailed(e));
                return Err(e.into());
            }
        };

        for e in &snapshot.rejected_plants {
            sink.emit(&AppEvent::PlantDropped(*e));
        }

        let had_prior = self.sequencer.last_accepted().is_some();
        let command = match snapshot.robot {
            None => CommandOutcome::Absent,
            Some(Err(e)) => {
                warn!("Service: robot command dropped: {}", e);
                sink.emit(&AppEvent::CommandDropped(e));
                CommandOutcome::Dropped(e)
            }
            Some(Ok(cmd)) => match self.sequencer.accept(cmd) {
                Ok(()) => {
                    sink.emit(&AppEvent::CommandAccepted(cmd));
                    CommandOutcome::Accepted(cmd)
                }
                Err(reason) => {
                    sink.emit(&AppEvent::CommandRejected(reason));
                    CommandOutcome::Rejected(reason)
                }
            },
        };
        // Acceptance only ever produces phase changes.
        for event in self.sequencer.drain_events() {
            sink.emit(&AppEvent::from(event));
        }

        if self.is_redelivery(&command) {
            debug!(
                "Service: delivery {} repeats the deferred snapshot, refresh kept",
                self.deliveries
            );
            return Ok(DeliveryReport {
                plant_changes: 0,
                plants_deferred: 0,
                rejected_plants: snapshot.rejected_plants.len(),
                command,
            });
        }

        self.snapshot_epoch += 1;
        let defer = had_prior && matches!(command, CommandOutcome::Accepted(_));
        let (plant_changes, plants_deferred) = if defer {
            let count = snapshot.plants.len();
            let delay = self.config.plant_refresh_delay_secs;
            match self
                .refreshes
                .schedule("plant-refresh", delay, self.snapshot_epoch, snapshot.plants)
            {
                Ok(()) => {
                    sink.emit(&AppEvent::PlantRefreshDeferred {
                        plants: count,
                        delay_secs: delay,
                    });
                    (0, count)
                }
                Err(plants) => (self.apply_plants(&plants, sink), 0),
            }
        } else {
            (self.apply_plants(&snapshot.plants, sink), 0)
        };

        Ok(DeliveryReport {
            plant_changes,
            plants_deferred,
            rejected_plants: snapshot.rejected_plants.len(),
            command,
        })
    }

    /// The snapshot carrying the last accepted command arrived again while
    /// its plant refresh is still waiting.
    fn is_redelivery(&self, command: &CommandOutcome) -> bool {
        let repeats_last = matches!(
            command,
            CommandOutcome::Rejected(Rejection::Stale { timestamp, last_accepted })
                if timestamp == last_accepted
        );
        repeats_last && self.refreshes.is_pending(self.snapshot_epoch)
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Advance deferred refreshes, the sequencer and the arm by `elapsed_secs`.
    pub fn tick(
        &mut self,
        elapsed_secs: f32,
        host: &mut impl HostPort,
        sink: &mut impl EventSink,
    ) {
        let mut collector = RefreshCollector::default();
        self.refreshes
            .tick(elapsed_secs, self.snapshot_epoch, &mut collector);
        for plants in collector.due {
            self.apply_plants(&plants, sink);
        }

        for event in self.sequencer.tick(elapsed_secs) {
            if let SequencerEvent::ArmSettled(offset) = event {
                if let Err(e) = host.report_manipulator_offset(&offset.to_string()) {
                    warn!("Service: offset report lost: {}", e);
                    sink.emit(&AppEvent::HostUnavailable(e));
                }
            }
            sink.emit(&AppEvent::from(event));
        }
    }

    /// Forward a pick to the host when `name` is a plant id.
    ///
    /// Returns `true` if the report was delivered.
    pub fn on_entity_picked(
        &mut self,
        name: &str,
        host: &mut impl HostPort,
        sink: &mut impl EventSink,
    ) -> bool {
        if name.trim().parse::<i32>().is_err() {
            debug!("Service: pick on non-plant entity {:?} ignored", name);
            return false;
        }
        match host.report_clicked_entity(name) {
            Ok(()) => true,
            Err(e) => {
                warn!("Service: click report for {} lost: {}", name, e);
                sink.emit(&AppEvent::HostUnavailable(e));
                false
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an inbound command from an adapter.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        clock: &impl ClockPort,
        host: &mut impl HostPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::Telemetry(raw) => {
                if let Err(e) = self.receive(&raw, clock, sink) {
                    debug!("Service: telemetry command failed: {}", e);
                }
            }
            AppCommand::EntityPicked(name) => {
                self.on_entity_picked(&name, host, sink);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn status(&self) -> TwinStatus {
        TwinStatus {
            phase: self.sequencer.phase(),
            last_accepted: self.sequencer.last_accepted(),
            command: self.sequencer.current_command(),
            indicator: self.sequencer.indicator(),
            robot_position: self.sequencer.robot_position(),
            plant_count: self.store.len(),
            pending_refreshes: self.refreshes.pending(),
        }
    }

    pub fn phase(&self) -> StateId {
        self.sequencer.phase()
    }

    pub fn plant(&self, id: PlantId) -> Option<&PlantEntity> {
        self.store.get(id)
    }

    pub fn plants(&self) -> impl Iterator<Item = &PlantEntity> {
        self.store.iter()
    }

    /// `true` when no command is in flight and no refresh is pending.
    pub fn is_idle(&self) -> bool {
        self.sequencer.is_quiescent() && self.refreshes.pending() == 0
    }

    pub fn config(&self) -> &TwinConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply_plants(&mut self, plants: &[PlantRecord], sink: &mut impl EventSink) -> usize {
        let changes = self.store.apply(plants);
        let count = changes.len();
        for change in changes {
            sink.emit(&AppEvent::PlantReplaced(change));
        }
        count
    }
}
