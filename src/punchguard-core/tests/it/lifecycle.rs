//! Clock reliability lifecycle across process restarts.
//!
//! Each test drives the engine the way a host process would: construct,
//! initialize, maybe correct, drop, construct again over the same
//! on-disk record.

use std::path::Path;
use std::sync::Arc;

use punchguard_core::signals::{DeviceSignals, FixedSignals};
use punchguard_core::store::{FileStore, STATE_FILE_NAME};
use punchguard_core::time_trust::TimeReliabilityEngine;

fn engine_over(dir: &Path, signals: &Arc<FixedSignals>) -> TimeReliabilityEngine {
    TimeReliabilityEngine::new(Arc::new(FileStore::new(dir)), signals.clone())
}

#[test]
fn first_online_run_persists_and_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let signals = Arc::new(FixedSignals::new());

    let engine = engine_over(dir.path(), &signals);
    let init = engine.initialize("boot-a", 1, true);
    assert!(init.is_first_run);
    assert_eq!(init.reliability_value, 85);
    assert!(dir.path().join(STATE_FILE_NAME).exists());

    engine.correct_with_network_time(1_700_000_000_000, "ntp");
    drop(engine);

    // Same process identity after a plain app restart: nothing pending.
    let engine = engine_over(dir.path(), &signals);
    let init = engine.initialize("boot-a", 1, true);

    assert!(!init.is_first_run);
    assert!(!init.is_rebooted);
    assert!(!init.is_cleared);
    assert_eq!(init.reliability_value, 100);
}

#[test]
fn offline_first_run_stacks_to_70() {
    let dir = tempfile::tempdir().unwrap();
    let signals = Arc::new(FixedSignals::new());

    let engine = engine_over(dir.path(), &signals);
    let init = engine.initialize("boot-a", 1, false);

    // 85 offline baseline with the data-clear deduction on top.
    assert_eq!(init.reliability_value, 70);
    assert!(init.is_cleared);
    assert!(init.clear_penalty_applied);
}

#[test]
fn double_initialize_on_first_run_ends_at_the_offline_baseline() {
    // The first-run branch keeps re-running until a correction writes a
    // time baseline, and it resets the clear latch each pass. The second
    // pass therefore lands on 85: baseline reset, no re-deduction since
    // the record already persisted.
    let dir = tempfile::tempdir().unwrap();
    let signals = Arc::new(FixedSignals::new());

    let engine = engine_over(dir.path(), &signals);
    assert_eq!(engine.initialize("boot-a", 1, false).reliability_value, 70);
    assert_eq!(engine.initialize("boot-a", 1, false).reliability_value, 85);
}

#[test]
fn reboot_cycle_across_restarts_charges_once_and_restores() {
    let dir = tempfile::tempdir().unwrap();
    let signals = Arc::new(FixedSignals::new());

    let engine = engine_over(dir.path(), &signals);
    engine.initialize("boot-a", 1, true);
    engine.correct_with_network_time(1_700_000_000_000, "ntp");
    drop(engine);

    // Device rebooted between app runs.
    let engine = engine_over(dir.path(), &signals);
    let init = engine.initialize("boot-b", 2, true);
    assert!(init.is_rebooted);
    assert_eq!(init.reliability_value, 85);
    drop(engine);

    // Restart without a new reboot: the flag persists, the charge does
    // not repeat.
    let engine = engine_over(dir.path(), &signals);
    let init = engine.initialize("boot-b", 2, true);
    assert!(init.is_rebooted);
    assert_eq!(init.reliability_value, 85);

    signals.set_boot_id("boot-b");
    signals.set_boot_count(2);
    let corrected = engine.correct_with_network_time(1_700_000_100_000, "ntp");
    assert!(!corrected.is_rebooted);
    assert_eq!(corrected.reliability_value, 100);
}

#[test]
fn large_skew_flags_cheating_with_the_measured_gap() {
    let signals = Arc::new(FixedSignals::new());
    signals.set_system_time(65_000);
    signals.set_elapsed_realtime(5_000);

    let dir = tempfile::tempdir().unwrap();
    let engine = engine_over(dir.path(), &signals);
    engine.initialize("boot-a", 1, true);
    engine.correct_with_network_time(1_000, "ntp");

    let verdict = engine.check_cheating();

    assert!(verdict.is_cheating_time);
    assert_eq!(verdict.time_skew, 64_000);
    assert!(verdict.cheating_reason.contains("64000ms > 60000ms"));
    assert_eq!(verdict.boot_start_time, 60_000);
    assert_eq!(verdict.boot_correct_time, 65_000);
}

#[test]
fn clean_state_reports_no_cheating_after_correction() {
    let signals = Arc::new(FixedSignals::new());
    let dir = tempfile::tempdir().unwrap();

    let engine = engine_over(dir.path(), &signals);
    engine.initialize("boot-a", 1, true);
    engine.correct_with_network_time(signals.system_time_ms(), "ntp");

    let verdict = engine.check_cheating();

    assert!(!verdict.is_cheating_time);
    assert!(verdict.cheating_reason.is_empty());
    assert_eq!(verdict.time_skew, 0);
    assert_eq!(verdict.reliability_value, 100);
}

#[test]
fn auto_time_sentinel_reads_as_disabled() {
    // A settings provider that cannot answer returns -1, and -1 counts
    // as "off" for the suspicion compound.
    let signals = Arc::new(FixedSignals::new());
    signals.set_auto_settings(-1, -1);

    let dir = tempfile::tempdir().unwrap();
    let engine = engine_over(dir.path(), &signals);
    engine.initialize("boot-a", 1, false);

    let verdict = engine.check_cheating();

    assert!(verdict.is_auto_time_off);
    assert!(verdict.is_auto_time_zone_off);
    assert!(!verdict.auto_time_enabled);
    assert!(verdict.is_cheating_time);
}
