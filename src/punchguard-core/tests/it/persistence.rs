//! On-disk record behavior: reloads, corruption, blocked writes.

use std::fs;
use std::sync::Arc;

use punchguard_core::signals::FixedSignals;
use punchguard_core::store::{FileStore, ReliabilityRecord, StateStore, STATE_FILE_NAME};
use punchguard_core::time_trust::TimeReliabilityEngine;

#[test]
fn record_round_trips_between_store_instances() {
    let dir = tempfile::tempdir().unwrap();

    let record = ReliabilityRecord {
        reliability_value: 85,
        is_rebooted: true,
        reboot_penalty_applied: true,
        last_boot_id: "boot-b".into(),
        last_boot_count: 2,
        last_legal_time: 1_700_000_000_000,
        network_real_time: 1_700_000_000_000,
        ..ReliabilityRecord::default()
    };
    FileStore::new(dir.path()).save(&record).unwrap();

    let reloaded = FileStore::new(dir.path()).load().unwrap();
    assert_eq!(reloaded, record);
}

#[test]
fn corrupt_record_reads_as_a_data_clear() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(STATE_FILE_NAME), b"{not json").unwrap();

    let engine = TimeReliabilityEngine::new(
        Arc::new(FileStore::new(dir.path())),
        Arc::new(FixedSignals::new()),
    );
    let init = engine.initialize("boot-a", 1, true);

    assert!(init.is_cleared);
    assert!(init.clear_penalty_applied);
    assert_eq!(init.reliability_value, 85);
}

#[test]
fn unknown_record_version_reads_as_a_data_clear() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    store.save(&ReliabilityRecord::default()).unwrap();

    let path = dir.path().join(STATE_FILE_NAME);
    let bumped = fs::read_to_string(&path)
        .unwrap()
        .replace("\"version\": 1", "\"version\": 99");
    fs::write(&path, bumped).unwrap();

    assert!(store.load().is_none());
}

#[test]
fn blocked_storage_keeps_the_engine_scoring() {
    // A plain file where the store expects its directory makes every
    // save fail; scoring continues off the in-memory record.
    let dir = tempfile::tempdir().unwrap();
    let blocked = dir.path().join("state");
    fs::write(&blocked, b"").unwrap();

    let engine = TimeReliabilityEngine::new(
        Arc::new(FileStore::new(&blocked)),
        Arc::new(FixedSignals::new()),
    );

    let init = engine.initialize("boot-a", 1, true);
    assert_eq!(init.reliability_value, 85);

    let corrected = engine.correct_with_network_time(1_700_000_000_000, "ntp");
    assert_eq!(corrected.reliability_value, 100);
    assert!(!corrected.is_cleared);
}

#[test]
fn persisted_flags_survive_the_reload() {
    let dir = tempfile::tempdir().unwrap();
    let signals = Arc::new(FixedSignals::new());

    let engine = TimeReliabilityEngine::new(
        Arc::new(FileStore::new(dir.path())),
        signals.clone(),
    );
    engine.initialize("boot-a", 1, true);
    engine.correct_with_network_time(1_700_000_000_000, "ntp");
    engine.initialize("boot-b", 2, true);
    drop(engine);

    // The pending reboot flag and its latch come back off disk.
    let record = FileStore::new(dir.path()).load().unwrap();
    assert!(record.is_rebooted);
    assert!(record.reboot_penalty_applied);
    assert_eq!(record.reliability_value, 85);
    assert_eq!(record.last_boot_id, "boot-b");
    assert_eq!(record.last_boot_count, 2);
}
