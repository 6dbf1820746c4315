//! End-to-end flows through the monitor facade.

use std::sync::Arc;

use punchguard_core::config::GuardConfig;
use punchguard_core::monitor::AntiCheatMonitor;
use punchguard_core::signals::{DeviceSignals, FixedSignals};
use punchguard_core::store::MemoryStore;
use punchguard_core::types::{
    LocationProvider, LocationSample, LocationSource, LocationStatus, RefreshKind,
};

fn make_monitor() -> (AntiCheatMonitor, Arc<FixedSignals>) {
    let signals = Arc::new(FixedSignals::new());
    let monitor = AntiCheatMonitor::with_parts(
        GuardConfig::default(),
        signals.clone(),
        Arc::new(MemoryStore::new()),
    );
    (monitor, signals)
}

fn good_fix() -> LocationSample {
    LocationSample {
        latitude: 10.762,
        longitude: 106.66,
        altitude: Some(12.0),
        speed_mps: Some(1.2),
        bearing: Some(45.0),
        accuracy: 6.0,
        provider: LocationProvider::Gps,
        satellites: 11,
        from_mock_provider: false,
        fix_time_ms: 1_700_000_000_000,
    }
}

#[test]
fn punch_flow_with_a_clean_device() {
    let (monitor, signals) = make_monitor();

    let init = monitor.start(true);
    assert!(init.is_first_run);

    monitor.correct_with_network_time(signals.system_time_ms(), "server");

    let location = monitor.on_location_update(&good_fix());
    assert_eq!(location.status, LocationStatus::Valid);
    assert_eq!(location.trust_score, 100);
    assert!(location.is_trusted);

    let cheating = monitor.check_cheating();
    assert!(!cheating.is_cheating_time);

    assert!(!monitor.mock_location_detected());
    assert!(monitor.location_check_active());

    let telemetry = monitor.telemetry();
    assert_eq!(telemetry.reliability_value, 100);
    assert_eq!(telemetry.reliability_value, monitor.time_reliability());
}

#[test]
fn punch_flow_with_a_mocked_location() {
    let (monitor, _) = make_monitor();
    monitor.start(true);

    let mut fix = good_fix();
    fix.from_mock_provider = true;

    let verdict = monitor.on_location_update(&fix);
    assert_eq!(verdict.status, LocationStatus::Fake);
    assert_eq!(verdict.trust_score, 0);

    // The flag feeds the security report until a clean sample lands.
    assert!(monitor.mock_location_detected());
    assert!(monitor.security_report().mock_location_active);

    monitor.on_location_update(&good_fix());
    assert!(!monitor.mock_location_detected());
    assert!(!monitor.security_report().mock_location_active);
}

#[test]
fn weak_fix_reads_suspicious_but_still_valid() {
    let (monitor, _) = make_monitor();

    let mut fix = good_fix();
    fix.satellites = 0;
    fix.altitude = None;

    let verdict = monitor.on_location_update(&fix);

    // 100 - 50 (no satellites) - 5 (no altitude) = 45.
    assert_eq!(verdict.trust_score, 45);
    assert_eq!(verdict.status, LocationStatus::Suspicious);
    assert!(verdict.is_valid);
    assert!(verdict.is_suspicious);
    assert!(!verdict.is_trusted);
    assert!(!verdict.is_fake);
}

#[test]
fn cached_fix_serves_follow_up_queries() {
    let (monitor, _) = make_monitor();

    let scored = monitor.on_location_update(&good_fix());
    assert_eq!(scored.refresh, RefreshKind::Normal);

    let cached = monitor.last_known_location(None, None).unwrap();
    assert_eq!(cached.refresh, RefreshKind::Cache);
    assert_eq!(cached.source, LocationSource::Cached);
    assert_eq!(cached.trust_score, scored.trust_score);
    assert_eq!(cached.gps_time, scored.gps_time);
}

#[test]
fn cold_cache_scores_the_fresher_candidate() {
    let (monitor, _) = make_monitor();

    let mut stale = good_fix();
    stale.fix_time_ms = 1_000;
    let mut fresh = good_fix();
    fresh.fix_time_ms = 2_000;
    fresh.latitude = 21.03;

    let verdict = monitor
        .last_known_location(Some(&stale), Some(&fresh))
        .unwrap();

    assert_eq!(verdict.gps_time, 2_000);
    assert!((verdict.latitude - 21.03).abs() < f64::EPSILON);
    assert_eq!(verdict.source, LocationSource::Cached);
}

#[test]
fn forced_refresh_keeps_its_tag_until_the_next_query() {
    let (monitor, _) = make_monitor();

    let forced = monitor.on_forced_update(&good_fix());
    assert_eq!(forced.refresh, RefreshKind::Force);

    let cached = monitor.last_known_location(None, None).unwrap();
    assert_eq!(cached.refresh, RefreshKind::Cache);
}

#[test]
fn kill_switch_survives_config_and_toggles() {
    let signals = Arc::new(FixedSignals::new());
    let monitor = AntiCheatMonitor::with_parts(
        GuardConfig {
            location_check_enabled: false,
            ..GuardConfig::default()
        },
        signals,
        Arc::new(MemoryStore::new()),
    );

    assert!(!monitor.location_check_active());

    monitor.set_location_check_enabled(true);
    assert!(monitor.location_check_active());

    monitor.set_bypassed(true);
    assert!(!monitor.location_check_active());
}

#[test]
fn timezone_report_follows_the_signal_source() {
    let (monitor, signals) = make_monitor();
    signals.set_time_zone_id("Europe/Berlin");
    signals.set_time_zone_offset(3_600_000);

    let report = monitor.timezone_report();

    assert_eq!(report.id, "Europe/Berlin");
    assert_eq!(report.offset_millis, 3_600_000);
}

#[test]
fn anomaly_hook_does_not_disturb_state() {
    let (monitor, _) = make_monitor();
    monitor.start(true);
    let before = monitor.time_reliability();

    monitor.report_time_anomaly("clock_jump", "system time moved backwards 90s");

    assert_eq!(monitor.time_reliability(), before);
}
