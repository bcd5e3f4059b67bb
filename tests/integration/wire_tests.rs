//! Wire-layout handling through the full service: both section orders,
//! partial failures and whole-delivery failures.

use greentwin::app::events::AppEvent;
use greentwin::app::service::{CommandOutcome, TwinService};
use greentwin::config::TwinConfig;
use greentwin::error::{DecodeError, Error, WireFormatError};
use greentwin::lifecycle::{GrowthStage, PlantEntity};
use greentwin::telemetry::{SectionOrder, normalize};

use crate::mock_host::{
    RecordingSink, clock, plant, planted_days_ago, plants_first, robot, robot_first,
};

fn registry(svc: &TwinService) -> Vec<PlantEntity> {
    let mut plants: Vec<PlantEntity> = svc.plants().copied().collect();
    plants.sort_by_key(|p| p.id);
    plants
}

fn sample_plants() -> Vec<String> {
    vec![
        plant(1, Some(&planted_days_ago(3)), Some("water")),
        plant(2, None, None),
        plant(9, Some(&planted_days_ago(80)), Some("fertilize")),
        plant(10, Some(&planted_days_ago(120)), None),
    ]
}

#[test]
fn both_orders_reconcile_identically() {
    let cmd = robot(1_751_309_115_999, "seed", 2);
    let a = plants_first(&sample_plants(), &cmd);
    let b = robot_first(&sample_plants(), &cmd);
    assert_eq!(
        greentwin::telemetry::normalize::detect_order(&a),
        Some(SectionOrder::PlantsFirst)
    );
    assert_eq!(
        greentwin::telemetry::normalize::detect_order(&b),
        Some(SectionOrder::RobotFirst)
    );

    let mut sink = RecordingSink::new();
    let mut svc_a = TwinService::new(TwinConfig::default()).unwrap();
    let mut svc_b = TwinService::new(TwinConfig::default()).unwrap();
    let report_a = svc_a.receive(&a, &clock(), &mut sink).unwrap();
    let report_b = svc_b.receive(&b, &clock(), &mut sink).unwrap();

    assert_eq!(report_a, report_b);
    assert_eq!(registry(&svc_a), registry(&svc_b));
    assert_eq!(svc_a.status(), svc_b.status());

    let stages: Vec<GrowthStage> = registry(&svc_a).iter().map(|p| p.stage).collect();
    assert_eq!(
        stages,
        vec![
            GrowthStage::Seedling,
            GrowthStage::Empty,
            GrowthStage::Fruiting,
            GrowthStage::Ripe,
        ]
    );
}

#[test]
fn malformed_command_still_applies_plants() {
    let mut svc = TwinService::new(TwinConfig::default()).unwrap();
    let mut sink = RecordingSink::new();
    let raw = robot_first(
        &sample_plants(),
        r#"{"time":"yesterday","action":"water","position":1}"#,
    );

    let report = svc.receive(&raw, &clock(), &mut sink).unwrap();
    assert_eq!(
        report.command,
        CommandOutcome::Dropped(DecodeError::MalformedTimestamp)
    );
    assert_eq!(report.plant_changes, 4);
    assert_eq!(svc.status().last_accepted, None);
}

#[test]
fn out_of_range_ids_are_dropped_individually() {
    let mut svc = TwinService::new(TwinConfig::default()).unwrap();
    let mut sink = RecordingSink::new();
    let raw = plants_first(
        &[plant(1, None, None), plant(150, None, None)],
        &robot(1000, "water", 101),
    );

    let report = svc.receive(&raw, &clock(), &mut sink).unwrap();
    assert_eq!(report.rejected_plants, 1);
    assert_eq!(report.plant_changes, 1);
    assert_eq!(
        report.command,
        CommandOutcome::Dropped(DecodeError::TargetOutOfRange(101))
    );
    assert!(
        sink.events
            .contains(&AppEvent::PlantDropped(DecodeError::IdOutOfRange(150)))
    );
}

#[test]
fn unrecognised_payload_keeps_prior_state() {
    let mut svc = TwinService::new(TwinConfig::default()).unwrap();
    let mut sink = RecordingSink::new();
    svc.receive(
        &plants_first(&sample_plants(), &robot(1000, "seed", 2)),
        &clock(),
        &mut sink,
    )
    .unwrap();
    let before = registry(&svc);

    for raw in ["", "   ", "[1,2,3]", r#"{"series":{"age":null}}"#] {
        let result = svc.receive(raw, &clock(), &mut sink);
        assert!(
            matches!(result, Err(Error::WireFormat(_))),
            "{raw:?} gave {result:?}"
        );
    }
    assert_eq!(
        svc.receive("", &clock(), &mut sink),
        Err(Error::WireFormat(WireFormatError::Empty))
    );
    assert_eq!(registry(&svc), before);
}

#[test]
fn canonical_payload_is_accepted_as_is() {
    let raw = format!(
        r#"{{"series":[{}],"robot":{}}}"#,
        sample_plants().join(","),
        robot(1000, "harvest", 10)
    );
    assert_eq!(normalize(&raw).as_str(), raw);

    let mut svc = TwinService::new(TwinConfig::default()).unwrap();
    let mut sink = RecordingSink::new();
    let report = svc.receive(&raw, &clock(), &mut sink).unwrap();
    assert_eq!(report.plant_changes, 4);
    assert!(matches!(report.command, CommandOutcome::Accepted(_)));
}
