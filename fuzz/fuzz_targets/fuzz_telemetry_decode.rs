//! Fuzz target: `normalize` + `decode`
//!
//! Drives arbitrary text through the wire normalizer and the decoder and
//! asserts that neither panics, that normalization is idempotent, and that
//! every decoded id stays within the configured capacity.
//!
//! cargo fuzz run fuzz_telemetry_decode

#![no_main]

use chrono::{TimeZone, Utc};
use greentwin::telemetry::{decode, normalize};
use libfuzzer_sys::fuzz_target;

const CAPACITY: u16 = 100;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = core::str::from_utf8(data) else {
        return;
    };

    let canonical = normalize(raw);
    assert_eq!(normalize(canonical.as_str()), canonical);

    let now = Utc.with_ymd_and_hms(2025, 7, 14, 12, 0, 0).unwrap();
    if let Ok(snapshot) = decode(&canonical, now, CAPACITY) {
        for plant in &snapshot.plants {
            assert!((1..=CAPACITY).contains(&plant.id));
            assert!(plant.age.is_none_or(|age| age >= chrono::Duration::zero()));
        }
        if let Some(Ok(cmd)) = snapshot.robot {
            assert!((1..=CAPACITY).contains(&cmd.target_plant_id));
        }
    }
});
