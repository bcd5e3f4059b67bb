//! End-to-end reconciliation scenarios: telemetry in, events and host
//! calls out, driven through `TwinService` with mock adapters.

use greentwin::app::commands::AppCommand;
use greentwin::app::events::AppEvent;
use greentwin::app::service::{CommandOutcome, TwinService};
use greentwin::config::TwinConfig;
use greentwin::error::Rejection;
use greentwin::fsm::StateId;
use greentwin::lifecycle::{GrowthStage, PlantChangeEvent};
use greentwin::telemetry::ActionKind;

use crate::mock_host::{
    RecordingHost, RecordingSink, clock, plant, planted_days_ago, plants_first, robot, run_for,
    run_until,
};

fn service(config: TwinConfig) -> (TwinService, RecordingHost, RecordingSink) {
    let mut svc = TwinService::new(config).unwrap();
    let mut sink = RecordingSink::new();
    svc.start(&mut sink);
    (svc, RecordingHost::new(), sink)
}

fn replaced(events: &[AppEvent]) -> Vec<PlantChangeEvent> {
    events
        .iter()
        .filter_map(|e| match e {
            AppEvent::PlantReplaced(c) => Some(*c),
            _ => None,
        })
        .collect()
}

fn phase_changes(events: &[AppEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, AppEvent::PhaseChanged { .. }))
        .count()
}

// ── Scenario A: empty slot gets planted ──────────────────────

#[test]
fn empty_slot_becomes_seedling() {
    let config = TwinConfig {
        seedling_age_days: 35,
        ..TwinConfig::default()
    };
    let (mut svc, _host, mut sink) = service(config);
    let cmd = robot(1000, "monitor", 5);

    svc.receive(&plants_first(&[plant(5, None, None)], &cmd), &clock(), &mut sink)
        .unwrap();
    assert_eq!(svc.plant(5).map(|p| p.stage), Some(GrowthStage::Empty));
    assert_eq!(
        svc.plant(5).and_then(|p| p.displayed_action),
        Some(ActionKind::Seed)
    );
    sink.take();

    let planted = planted_days_ago(30);
    svc.receive(
        &plants_first(&[plant(5, Some(&planted), None)], &cmd),
        &clock(),
        &mut sink,
    )
    .unwrap();

    let changes = replaced(&sink.take());
    assert_eq!(changes.len(), 1);
    let PlantChangeEvent::Replace {
        id,
        stage,
        previous,
        ..
    } = changes[0];
    assert_eq!(id, 5);
    assert_eq!(stage, GrowthStage::Seedling);
    assert_eq!(previous, Some(GrowthStage::Empty));
}

// ── Scenario B: stale, then busy ─────────────────────────────

#[test]
fn stale_then_busy_commands_rejected() {
    let (mut svc, _host, mut sink) = service(TwinConfig::default());
    let plants = [plant(3, None, None), plant(7, None, None)];

    let first = svc
        .receive(&plants_first(&plants, &robot(1000, "water", 3)), &clock(), &mut sink)
        .unwrap();
    assert!(matches!(first.command, CommandOutcome::Accepted(_)));
    assert_eq!(svc.phase(), StateId::Moving);

    let stale = svc
        .receive(&plants_first(&plants, &robot(999, "harvest", 7)), &clock(), &mut sink)
        .unwrap();
    assert!(matches!(
        stale.command,
        CommandOutcome::Rejected(Rejection::Stale { .. })
    ));

    let busy = svc
        .receive(&plants_first(&plants, &robot(2000, "harvest", 7)), &clock(), &mut sink)
        .unwrap();
    assert_eq!(
        busy.command,
        CommandOutcome::Rejected(Rejection::Busy {
            phase: StateId::Moving,
            in_flight_target: 3,
        })
    );

    let status = svc.status();
    let in_flight = status.command.unwrap();
    assert_eq!(in_flight.action, ActionKind::Water);
    assert_eq!(in_flight.target_plant_id, 3);
    assert_eq!(status.last_accepted.unwrap().timestamp_millis(), 1000);
}

// ── Scenario C: unknown action ───────────────────────────────

#[test]
fn unknown_action_runs_without_indicator() {
    let (mut svc, mut host, mut sink) = service(TwinConfig::default());

    let report = svc
        .receive(
            &plants_first(&[plant(2, None, None)], &robot(1000, "fooify", 2)),
            &clock(),
            &mut sink,
        )
        .unwrap();
    let CommandOutcome::Accepted(cmd) = report.command else {
        panic!("expected acceptance, got {:?}", report.command);
    };
    assert_eq!(cmd.action, ActionKind::Unknown);

    run_until(&mut svc, &mut host, &mut sink, StateId::Acting);
    assert_eq!(svc.status().indicator, None);

    run_until(&mut svc, &mut host, &mut sink, StateId::Idle);
    assert!(
        !sink
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::IndicatorChanged(Some(_))))
    );
}

// ── Idempotence ──────────────────────────────────────────────

#[test]
fn identical_snapshot_twice_is_a_no_op() {
    let (mut svc, _host, mut sink) = service(TwinConfig::default());
    let planted = planted_days_ago(50);
    let raw = plants_first(
        &[
            plant(1, Some(&planted), Some("water")),
            plant(2, None, None),
            plant(3, Some(&planted_days_ago(200)), None),
        ],
        &robot(1_751_309_115_999, "seed", 2),
    );

    let first = svc.receive(&raw, &clock(), &mut sink).unwrap();
    assert_eq!(first.plant_changes, 3);
    sink.take();

    let second = svc.receive(&raw, &clock(), &mut sink).unwrap();
    let events = sink.take();
    assert_eq!(second.plant_changes, 0);
    assert!(replaced(&events).is_empty());
    assert_eq!(phase_changes(&events), 0);
    assert!(matches!(
        second.command,
        CommandOutcome::Rejected(Rejection::Stale { .. })
    ));
}

#[test]
fn repeated_snapshot_keeps_its_deferred_refresh() {
    let (mut svc, mut host, mut sink) = service(TwinConfig::default());
    svc.receive(
        &plants_first(&[plant(6, None, None)], &robot(1000, "seed", 6)),
        &clock(),
        &mut sink,
    )
    .unwrap();
    run_until(&mut svc, &mut host, &mut sink, StateId::Acting);
    run_until(&mut svc, &mut host, &mut sink, StateId::Idle);

    let raw = plants_first(
        &[plant(6, Some(&planted_days_ago(3)), None)],
        &robot(2000, "water", 6),
    );
    let first = svc.receive(&raw, &clock(), &mut sink).unwrap();
    assert_eq!(first.plants_deferred, 1);
    sink.take();

    run_for(&mut svc, &mut host, &mut sink, 1.0);
    let second = svc.receive(&raw, &clock(), &mut sink).unwrap();
    let events = sink.take();
    assert_eq!(second.plant_changes, 0);
    assert_eq!(second.plants_deferred, 0);
    assert!(replaced(&events).is_empty());
    assert_eq!(svc.plant(6).map(|p| p.stage), Some(GrowthStage::Empty));
    assert_eq!(svc.status().pending_refreshes, 1);

    // The original deferral still fires on its own schedule.
    run_for(&mut svc, &mut host, &mut sink, 4.5);
    assert_eq!(svc.plant(6).map(|p| p.stage), Some(GrowthStage::Seedling));
    assert_eq!(svc.status().pending_refreshes, 0);

    // Once applied, the same snapshot changes nothing.
    sink.take();
    let third = svc.receive(&raw, &clock(), &mut sink).unwrap();
    assert_eq!(third.plant_changes, 0);
    assert!(replaced(&sink.take()).is_empty());
}

#[test]
fn newer_command_rejected_while_acting() {
    let (mut svc, mut host, mut sink) = service(TwinConfig::default());
    svc.receive(
        &plants_first(&[plant(3, None, None)], &robot(1000, "harvest", 3)),
        &clock(),
        &mut sink,
    )
    .unwrap();
    run_until(&mut svc, &mut host, &mut sink, StateId::Acting);
    sink.take();

    let report = svc
        .receive(
            &plants_first(&[plant(3, None, None)], &robot(2000, "water", 9)),
            &clock(),
            &mut sink,
        )
        .unwrap();
    assert_eq!(
        report.command,
        CommandOutcome::Rejected(Rejection::Busy {
            phase: StateId::Acting,
            in_flight_target: 3
        })
    );
    assert_eq!(phase_changes(&sink.take()), 0);
    let status = svc.status();
    assert_eq!(status.phase, StateId::Acting);
    assert_eq!(status.indicator, Some(ActionKind::Harvest));
    assert_eq!(status.command.map(|c| c.target_plant_id), Some(3));
    assert_eq!(status.last_accepted.map(|t| t.timestamp_millis()), Some(1000));

    run_until(&mut svc, &mut host, &mut sink, StateId::Idle);
    assert_eq!(svc.status().indicator, None);
    assert_eq!(host.offsets().len(), 1);
}

// ── Full cycle and host report ───────────────────────────────

#[test]
fn full_cycle_reports_offset_once() {
    let (mut svc, mut host, mut sink) = service(TwinConfig::default());
    svc.receive(
        &plants_first(&[plant(4, None, None)], &robot(1000, "water", 4)),
        &clock(),
        &mut sink,
    )
    .unwrap();

    run_until(&mut svc, &mut host, &mut sink, StateId::Acting);
    assert_eq!(svc.status().indicator, Some(ActionKind::Water));
    run_until(&mut svc, &mut host, &mut sink, StateId::Idle);
    run_for(&mut svc, &mut host, &mut sink, 2.0);

    let offsets = host.offsets();
    assert_eq!(offsets.len(), 1);
    let offset = offsets[0];
    assert!(offset.starts_with('(') && offset.ends_with(')'), "{offset}");
    assert_eq!(offset.split(", ").count(), 3, "{offset}");
    assert!(svc.is_idle());
    assert_eq!(svc.status().command, None);
}

#[test]
fn detached_host_does_not_stall_the_cycle() {
    let mut svc = TwinService::new(TwinConfig::default()).unwrap();
    let mut host = RecordingHost::detached();
    let mut sink = RecordingSink::new();

    svc.receive(
        &plants_first(&[plant(1, None, None)], &robot(1000, "seed", 1)),
        &clock(),
        &mut sink,
    )
    .unwrap();
    run_until(&mut svc, &mut host, &mut sink, StateId::Acting);
    run_until(&mut svc, &mut host, &mut sink, StateId::Idle);

    assert!(
        sink.events
            .iter()
            .any(|e| matches!(e, AppEvent::HostUnavailable(_)))
    );
    assert!(!svc.on_entity_picked("1", &mut host, &mut sink));
}

// ── Deferred plant refresh ───────────────────────────────────

#[test]
fn plants_follow_a_later_command_after_the_delay() {
    let (mut svc, mut host, mut sink) = service(TwinConfig::default());
    let seed = robot(1000, "seed", 6);
    svc.receive(&plants_first(&[plant(6, None, None)], &seed), &clock(), &mut sink)
        .unwrap();
    run_until(&mut svc, &mut host, &mut sink, StateId::Acting);
    run_until(&mut svc, &mut host, &mut sink, StateId::Idle);

    let planted = planted_days_ago(1);
    let report = svc
        .receive(
            &plants_first(&[plant(6, Some(&planted), None)], &robot(2000, "water", 6)),
            &clock(),
            &mut sink,
        )
        .unwrap();
    assert_eq!(report.plant_changes, 0);
    assert_eq!(report.plants_deferred, 1);
    assert_eq!(svc.status().pending_refreshes, 1);

    run_for(&mut svc, &mut host, &mut sink, 4.5);
    assert_eq!(svc.plant(6).map(|p| p.stage), Some(GrowthStage::Empty));

    run_for(&mut svc, &mut host, &mut sink, 1.0);
    assert_eq!(svc.plant(6).map(|p| p.stage), Some(GrowthStage::Seedling));
    assert_eq!(svc.status().pending_refreshes, 0);
}

#[test]
fn superseded_refresh_does_not_revert_newer_plants() {
    let (mut svc, mut host, mut sink) = service(TwinConfig::default());
    svc.receive(
        &plants_first(&[plant(8, None, None)], &robot(1000, "seed", 8)),
        &clock(),
        &mut sink,
    )
    .unwrap();
    run_until(&mut svc, &mut host, &mut sink, StateId::Acting);
    run_until(&mut svc, &mut host, &mut sink, StateId::Idle);

    // Deferred: plant 8 as a seedling.
    let newer = robot(2000, "water", 8);
    svc.receive(
        &plants_first(&[plant(8, Some(&planted_days_ago(2)), None)], &newer),
        &clock(),
        &mut sink,
    )
    .unwrap();

    // An older command is stale, so these plants apply at once.
    run_for(&mut svc, &mut host, &mut sink, 1.0);
    svc.receive(
        &plants_first(
            &[plant(8, Some(&planted_days_ago(300)), None)],
            &robot(1500, "water", 8),
        ),
        &clock(),
        &mut sink,
    )
    .unwrap();
    assert_eq!(svc.plant(8).map(|p| p.stage), Some(GrowthStage::Ripe));

    run_for(&mut svc, &mut host, &mut sink, 6.0);
    assert_eq!(svc.plant(8).map(|p| p.stage), Some(GrowthStage::Ripe));
    assert_eq!(svc.status().pending_refreshes, 0);
}

// ── Commands from adapters ───────────────────────────────────

#[test]
fn handle_command_dispatches_telemetry_and_picks() {
    let (mut svc, mut host, mut sink) = service(TwinConfig::default());

    svc.handle_command(
        AppCommand::Telemetry(plants_first(
            &[plant(12, None, None)],
            &robot(1000, "monitor", 12),
        )),
        &clock(),
        &mut host,
        &mut sink,
    );
    assert_eq!(svc.status().plant_count, 1);
    assert_eq!(svc.phase(), StateId::Moving);

    svc.handle_command(AppCommand::EntityPicked("12".into()), &clock(), &mut host, &mut sink);
    svc.handle_command(
        AppCommand::EntityPicked("Greenhouse".into()),
        &clock(),
        &mut host,
        &mut sink,
    );
    assert_eq!(
        host.calls,
        vec![crate::mock_host::HostCall::Clicked("12".into())]
    );

    // Garbage is absorbed.
    svc.handle_command(
        AppCommand::Telemetry("{\"series\":".into()),
        &clock(),
        &mut host,
        &mut sink,
    );
    assert!(matches!(sink.events.last(), Some(AppEvent::DeliveryFailed(_))));
    assert_eq!(svc.status().plant_count, 1);
}
