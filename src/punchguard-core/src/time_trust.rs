//! Clock reliability state machine.
//!
//! The engine owns one persisted [`ReliabilityRecord`] and walks it through
//! three kinds of events: process starts (`initialize`), network time
//! corrections (`correct_with_network_time`), and pure reads
//! (`check_cheating`, `telemetry`). Reboots and data clears each cost 15
//! points exactly once per event; a correction credits the deduction back
//! and re-arms detection. Mutating calls serialize behind a write lock,
//! reads share a read lock.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::signals::DeviceSignals;
use crate::store::{ReliabilityRecord, StateStore};
use crate::types::{CheatingVerdict, TelemetrySnapshot, TimeCorrectionVerdict, TimeInitVerdict};

/// Points deducted for a detected reboot, credited back on correction.
pub const REBOOT_PENALTY: i32 = 15;

/// Points deducted for a detected data clear, credited back on correction.
pub const CLEAR_PENALTY: i32 = 15;

/// Largest tolerated distance between system clock and network time.
pub const TIME_SKEW_THRESHOLD_MS: i64 = 60_000;

/// Score above which pending events alone do not flag cheating.
pub const RELIABILITY_HEALTHY_THRESHOLD: i32 = 90;

/// First-run score when the host reports network connectivity.
pub const FIRST_RUN_SCORE_ONLINE: i32 = 100;

/// First-run score without network connectivity.
pub const FIRST_RUN_SCORE_OFFLINE: i32 = 85;

/// Upper clamp for the reliability score.
pub const RELIABILITY_MAX: i32 = 100;

/// Tracks whether the device clock can be trusted across reboots, data
/// clears, and manual adjustments.
pub struct TimeReliabilityEngine {
    state: RwLock<EngineState>,
    store: Arc<dyn StateStore>,
    signals: Arc<dyn DeviceSignals>,
}

struct EngineState {
    record: ReliabilityRecord,
    /// Whether the store held a record when this engine loaded, or a save
    /// has succeeded since. `false` is the data-clear signal.
    had_persisted: bool,
}

impl TimeReliabilityEngine {
    /// Create an engine, loading any persisted record from the store.
    pub fn new(store: Arc<dyn StateStore>, signals: Arc<dyn DeviceSignals>) -> Self {
        let loaded = store.load();
        let had_persisted = loaded.is_some();
        let record = loaded.unwrap_or_default();

        debug!(
            score = record.reliability_value,
            restored = had_persisted,
            "TimeTrust: engine created"
        );

        Self {
            state: RwLock::new(EngineState {
                record,
                had_persisted,
            }),
            store,
            signals,
        }
    }

    /// Current reliability score, [0,100].
    #[must_use]
    pub fn reliability_value(&self) -> i32 {
        self.state.read().record.reliability_value
    }

    /// Run the process-start pass: first-run baseline, reboot detection,
    /// clear detection, penalties, persistence.
    ///
    /// Boot id and count are supplied by the caller so the host can resolve
    /// them from whatever source the platform offers; "" and values ≤ 0
    /// mean the signal is unavailable, never that a reboot happened.
    pub fn initialize(
        &self,
        current_boot_id: &str,
        current_boot_count: i32,
        network_available: bool,
    ) -> TimeInitVerdict {
        let mut st = self.state.write();

        let prev_boot_id = st.record.last_boot_id.clone();
        let prev_boot_count = st.record.last_boot_count;

        // No time baseline at all means this is the first pass ever (or the
        // first since the baseline was wiped).
        let is_first_run =
            st.record.last_legal_time == 0 && st.record.network_real_time == 0;
        if is_first_run {
            st.record.reliability_value = if network_available {
                FIRST_RUN_SCORE_ONLINE
            } else {
                FIRST_RUN_SCORE_OFFLINE
            };
            st.record.is_cleared = true;
            st.record.clear_penalty_applied = false;
            debug!(
                score = st.record.reliability_value,
                network = network_available,
                "TimeTrust: first-run baseline set"
            );
        }

        if reboot_occurred(
            current_boot_id,
            current_boot_count,
            &prev_boot_id,
            prev_boot_count,
        ) {
            st.record.is_rebooted = true;
            if !st.record.reboot_penalty_applied {
                st.record.reliability_value -= REBOOT_PENALTY;
                st.record.reboot_penalty_applied = true;
                warn!(
                    score = st.record.reliability_value,
                    boot_id = current_boot_id,
                    boot_count = current_boot_count,
                    "TimeTrust: reboot penalty applied"
                );
            }
        }

        if !st.had_persisted {
            st.record.is_cleared = true;
            if !st.record.clear_penalty_applied {
                st.record.reliability_value -= CLEAR_PENALTY;
                st.record.clear_penalty_applied = true;
                warn!(
                    score = st.record.reliability_value,
                    "TimeTrust: data-clear penalty applied"
                );
            }
        }

        if st.record.reliability_value < 0 {
            st.record.reliability_value = 0;
        }

        st.record.last_boot_id = current_boot_id.to_string();
        st.record.last_boot_count = current_boot_count;
        self.persist(&mut st);

        let system_time = self.signals.system_time_ms();
        let elapsed_realtime = self.signals.elapsed_realtime_ms();
        let auto_time_switch = self.signals.auto_time_setting();
        let auto_time_zone_switch = self.signals.auto_time_zone_setting();

        TimeInitVerdict {
            reliability_value: st.record.reliability_value,
            is_rebooted: st.record.is_rebooted,
            is_cleared: st.record.is_cleared,
            reboot_penalty_applied: st.record.reboot_penalty_applied,
            clear_penalty_applied: st.record.clear_penalty_applied,
            is_first_run,
            current_boot_id: current_boot_id.to_string(),
            last_boot_id: prev_boot_id,
            current_boot_count,
            last_boot_count: prev_boot_count,
            is_network_connected: network_available,
            auto_time_switch,
            auto_time_zone_switch,
            is_auto_time_off: auto_time_switch <= 0,
            is_auto_time_zone_off: auto_time_zone_switch <= 0,
            system_time,
            elapsed_realtime,
            boot_start_time: system_time - elapsed_realtime,
            network_real_time: st.record.network_real_time,
            last_legal_time: st.record.last_legal_time,
        }
    }

    /// Apply an externally trusted time reading.
    ///
    /// Credits back pending reboot/clear deductions, re-arms the reboot
    /// baseline, and persists. The penalty latches stay set: they only
    /// guard against double-charging the same uncorrected event.
    pub fn correct_with_network_time(
        &self,
        network_time: i64,
        source: &str,
    ) -> TimeCorrectionVerdict {
        let mut st = self.state.write();

        st.record.network_real_time = network_time;

        if st.record.is_rebooted {
            st.record.reliability_value += REBOOT_PENALTY;
            st.record.is_rebooted = false;
        }

        if st.record.is_cleared {
            st.record.last_legal_time = network_time;
            st.record.reliability_value += CLEAR_PENALTY;
            st.record.is_cleared = false;
        }

        if st.record.reliability_value > RELIABILITY_MAX {
            st.record.reliability_value = RELIABILITY_MAX;
        }

        // Re-sync the boot baseline so the same reboot is not flagged again
        // on the next initialize.
        st.record.last_boot_id = self.signals.boot_id();
        st.record.last_boot_count = self.signals.boot_count();
        self.persist(&mut st);

        info!(
            source,
            network_time,
            score = st.record.reliability_value,
            "TimeTrust: network time correction applied"
        );

        TimeCorrectionVerdict {
            reliability_value: st.record.reliability_value,
            is_rebooted: st.record.is_rebooted,
            is_cleared: st.record.is_cleared,
            network_real_time: st.record.network_real_time,
            last_legal_time: st.record.last_legal_time,
            source: source.to_string(),
        }
    }

    /// Evaluate the current state against the live clock. Pure read.
    pub fn check_cheating(&self) -> CheatingVerdict {
        let st = self.state.read();
        let record = &st.record;

        let system_time = self.signals.system_time_ms();
        let elapsed_realtime = self.signals.elapsed_realtime_ms();
        let boot_start_time = system_time - elapsed_realtime;

        let auto_time_switch = self.signals.auto_time_setting();
        let auto_time_zone_switch = self.signals.auto_time_zone_setting();
        let is_auto_time_off = auto_time_switch <= 0;
        let is_auto_time_zone_off = auto_time_zone_switch <= 0;

        let time_skew = if record.network_real_time > 0 {
            (system_time - record.network_real_time).abs()
        } else {
            0
        };

        let score_healthy = record.reliability_value > RELIABILITY_HEALTHY_THRESHOLD;
        let flagged_event = record.is_cleared || record.is_rebooted;
        let auto_time_suspicious = is_auto_time_off || is_auto_time_zone_off;
        let skew_ok = time_skew <= TIME_SKEW_THRESHOLD_MS;

        // The compound reason below repeats this guard; with both written
        // out as-is, a cheating verdict can carry an empty reason.
        let not_cheating =
            (score_healthy || !(flagged_event && auto_time_suspicious)) && skew_ok;
        let is_cheating_time = !not_cheating;

        let mut cheating_reason = String::new();
        if is_cheating_time {
            if time_skew > TIME_SKEW_THRESHOLD_MS {
                cheating_reason = format!(
                    "Time skew exceeds threshold: {}ms > {}ms",
                    time_skew, TIME_SKEW_THRESHOLD_MS
                );
            } else if flagged_event
                && auto_time_suspicious
                && record.reliability_value <= RELIABILITY_HEALTHY_THRESHOLD
            {
                cheating_reason = format!(
                    "Suspicious: (rebooted={}/cleared={}) + (autoTimeOff={}/autoTimeZoneOff={}) + score={}",
                    record.is_rebooted,
                    record.is_cleared,
                    is_auto_time_off,
                    is_auto_time_zone_off,
                    record.reliability_value
                );
            }
        }

        if is_cheating_time {
            warn!(
                skew = time_skew,
                score = record.reliability_value,
                reason = %cheating_reason,
                "TimeTrust: clock flagged as untrustworthy"
            );
        }

        CheatingVerdict {
            is_cheating_time,
            cheating_reason,
            reliability_value: record.reliability_value,
            time_skew,
            system_time,
            elapsed_realtime,
            boot_start_time,
            boot_correct_time: boot_start_time + elapsed_realtime,
            network_real_time: record.network_real_time,
            auto_time_switch,
            auto_time_zone_switch,
            is_auto_time_off,
            is_auto_time_zone_off,
            auto_time_enabled: auto_time_switch > 0,
            auto_time_zone_enabled: auto_time_zone_switch > 0,
            is_rebooted: record.is_rebooted,
            is_cleared: record.is_cleared,
            reboot_penalty_applied: record.reboot_penalty_applied,
            clear_penalty_applied: record.clear_penalty_applied,
        }
    }

    /// Project the persisted record plus live signals. Pure read.
    pub fn telemetry(&self) -> TelemetrySnapshot {
        let st = self.state.read();
        let record = &st.record;

        let system_time = self.signals.system_time_ms();
        let elapsed_realtime = self.signals.elapsed_realtime_ms();
        let boot_start_time = system_time - elapsed_realtime;
        let calculated_time = boot_start_time + elapsed_realtime;

        TelemetrySnapshot {
            boot_id: self.signals.boot_id(),
            last_boot_id: record.last_boot_id.clone(),
            boot_count: self.signals.boot_count(),
            last_boot_count: record.last_boot_count,
            auto_time_switch: self.signals.auto_time_setting(),
            auto_time_zone_switch: self.signals.auto_time_zone_setting(),
            elapsed_realtime,
            system_time,
            boot_start_time,
            network_real_time: record.network_real_time,
            last_legal_time: record.last_legal_time,
            reliability_value: record.reliability_value,
            is_rebooted: record.is_rebooted,
            is_cleared: record.is_cleared,
            calculated_time,
            clock_drift: system_time - calculated_time,
            time_zone: self.signals.time_zone_id(),
            time_zone_offset: self.signals.time_zone_offset_ms(),
        }
    }

    /// Save the record, keeping memory authoritative on failure.
    fn persist(&self, st: &mut EngineState) {
        match self.store.save(&st.record) {
            Ok(()) => st.had_persisted = true,
            Err(e) => {
                warn!("TimeTrust: state save failed, continuing in memory: {}", e);
            },
        }
    }
}

/// Decide whether the boot signals indicate a reboot.
///
/// Boot counts win when both sides have one; boot ids are the fallback.
/// Sentinels (count ≤ 0, empty id) mean "no signal", never "rebooted".
fn reboot_occurred(current_id: &str, current_count: i32, last_id: &str, last_count: i32) -> bool {
    if current_count > 0 && last_count > 0 {
        return current_count != last_count;
    }
    if !current_id.is_empty() && !last_id.is_empty() {
        return current_id != last_id;
    }
    false
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::*;
    use crate::error::GuardError;
    use crate::signals::FixedSignals;
    use crate::store::MemoryStore;

    fn make_engine() -> (TimeReliabilityEngine, Arc<MemoryStore>, Arc<FixedSignals>) {
        let store = Arc::new(MemoryStore::new());
        let signals = Arc::new(FixedSignals::new());
        let engine = TimeReliabilityEngine::new(store.clone(), signals.clone());
        (engine, store, signals)
    }

    /// A store whose saves always fail, for best-effort coverage.
    struct FailingStore;

    impl StateStore for FailingStore {
        fn load(&self) -> Option<ReliabilityRecord> {
            None
        }

        fn save(&self, _record: &ReliabilityRecord) -> Result<(), GuardError> {
            Err(GuardError::Storage {
                message: "disk on fire".into(),
            })
        }
    }

    /// Signals whose wall clock advances one millisecond per read.
    struct TickingSignals {
        now: AtomicI64,
    }

    impl TickingSignals {
        fn new() -> Self {
            Self {
                now: AtomicI64::new(1_700_000_000_000),
            }
        }
    }

    impl DeviceSignals for TickingSignals {
        fn boot_id(&self) -> String {
            "boot-a".to_string()
        }

        fn boot_count(&self) -> i32 {
            1
        }

        fn auto_time_setting(&self) -> i32 {
            1
        }

        fn auto_time_zone_setting(&self) -> i32 {
            1
        }

        fn system_time_ms(&self) -> i64 {
            self.now.fetch_add(1, Ordering::Relaxed)
        }

        fn elapsed_realtime_ms(&self) -> i64 {
            100_000
        }

        fn time_zone_id(&self) -> String {
            String::new()
        }

        fn time_zone_offset_ms(&self) -> i64 {
            0
        }
    }

    #[test]
    fn first_run_with_network_lands_at_85() {
        // 100 baseline, then the clear penalty for the empty store.
        let (engine, _, _) = make_engine();
        let verdict = engine.initialize("boot-a", 1, true);

        assert!(verdict.is_first_run);
        assert_eq!(verdict.reliability_value, 85);
        assert!(verdict.is_cleared);
        assert!(verdict.clear_penalty_applied);
        assert!(!verdict.is_rebooted);
    }

    #[test]
    fn first_run_without_network_lands_at_70() {
        // 85 baseline stacked with the clear penalty.
        let (engine, _, _) = make_engine();
        let verdict = engine.initialize("boot-a", 1, false);

        assert!(verdict.is_first_run);
        assert_eq!(verdict.reliability_value, 70);
        assert!(verdict.is_cleared);
        assert!(verdict.clear_penalty_applied);
    }

    #[test]
    fn reboot_detected_by_boot_count() {
        let (engine, _, _) = make_engine();
        engine.initialize("boot-a", 5, true);
        engine.correct_with_network_time(1_700_000_000_000, "ntp");

        let verdict = engine.initialize("boot-b", 6, true);

        assert!(verdict.is_rebooted);
        assert!(verdict.reboot_penalty_applied);
        assert_eq!(verdict.reliability_value, 85);
    }

    #[test]
    fn reboot_detected_by_boot_id_when_counts_missing() {
        let (engine, _, _) = make_engine();
        engine.initialize("boot-a", -1, true);
        engine.correct_with_network_time(1_700_000_000_000, "ntp");

        let verdict = engine.initialize("boot-b", -1, true);

        assert!(verdict.is_rebooted);
        assert_eq!(verdict.reliability_value, 85);
    }

    #[test]
    fn sentinel_signals_never_read_as_reboot() {
        assert!(!reboot_occurred("", -1, "", -1));
        assert!(!reboot_occurred("boot-a", -1, "", 0));
        assert!(!reboot_occurred("", 3, "boot-a", 0));
        // Counts win over ids when both sides have them.
        assert!(!reboot_occurred("boot-b", 3, "boot-a", 3));
        assert!(reboot_occurred("boot-a", 4, "boot-a", 3));
        assert!(reboot_occurred("boot-b", -1, "boot-a", 0));
    }

    #[test]
    fn reboot_penalty_latch_is_idempotent() {
        let (engine, _, _) = make_engine();
        engine.initialize("boot-a", 1, true);
        engine.correct_with_network_time(1_700_000_000_000, "ntp");

        let first = engine.initialize("boot-b", 2, true);
        assert_eq!(first.reliability_value, 85);

        // Same boot again: baseline was re-synced, no new penalty.
        let second = engine.initialize("boot-b", 2, true);
        assert_eq!(second.reliability_value, 85);
        assert!(second.is_rebooted, "event stays pending until corrected");
    }

    #[test]
    fn second_reboot_while_latched_costs_nothing_more() {
        let (engine, _, _) = make_engine();
        engine.initialize("boot-a", 1, true);
        engine.correct_with_network_time(1_700_000_000_000, "ntp");

        engine.initialize("boot-b", 2, true);
        let verdict = engine.initialize("boot-c", 3, true);

        assert_eq!(verdict.reliability_value, 85);
        assert!(verdict.is_rebooted);
    }

    #[test]
    fn correction_credits_back_reboot_penalty() {
        let (engine, _, _) = make_engine();
        engine.initialize("boot-a", 1, true);
        engine.correct_with_network_time(1_700_000_000_000, "ntp");
        engine.initialize("boot-b", 2, true);
        assert_eq!(engine.reliability_value(), 85);

        let verdict = engine.correct_with_network_time(1_700_000_100_000, "ntp");

        assert_eq!(verdict.reliability_value, 100);
        assert!(!verdict.is_rebooted);
    }

    #[test]
    fn correction_restores_clear_and_sets_legal_time() {
        let (engine, _, _) = make_engine();
        let init = engine.initialize("boot-a", 1, true);
        assert_eq!(init.reliability_value, 85);
        assert!(init.is_cleared);

        let verdict = engine.correct_with_network_time(1_700_000_000_123, "server");

        assert_eq!(verdict.reliability_value, 100);
        assert!(!verdict.is_cleared);
        assert_eq!(verdict.last_legal_time, 1_700_000_000_123);
        assert_eq!(verdict.network_real_time, 1_700_000_000_123);
    }

    #[test]
    fn correction_clamps_at_100() {
        let (engine, _, _) = make_engine();
        // First run online: 100 - 15 (clear) = 85, cleared pending.
        engine.initialize("boot-a", 1, true);
        // Credit +15 -> exactly 100.
        engine.correct_with_network_time(1_700_000_000_000, "ntp");
        // Nothing pending: plain re-correction stays clamped.
        let verdict = engine.correct_with_network_time(1_700_000_000_500, "ntp");
        assert_eq!(verdict.reliability_value, 100);
    }

    #[test]
    fn init_verdict_carries_the_stored_times() {
        let (engine, _, _) = make_engine();
        let first = engine.initialize("boot-a", 1, true);
        assert_eq!(first.network_real_time, 0);
        assert_eq!(first.last_legal_time, 0);

        engine.correct_with_network_time(1_700_000_000_123, "ntp");
        let verdict = engine.initialize("boot-a", 1, true);

        assert_eq!(verdict.network_real_time, 1_700_000_000_123);
        assert_eq!(verdict.last_legal_time, 1_700_000_000_123);
    }

    #[test]
    fn corrected_reboot_is_not_reflagged() {
        let (engine, _, signals) = make_engine();
        engine.initialize("boot-a", 1, true);
        engine.correct_with_network_time(1_700_000_000_000, "ntp");

        engine.initialize("boot-b", 2, true);
        // Live signals agree with the new boot before the correction
        // re-syncs the baseline from them.
        signals.set_boot_id("boot-b");
        signals.set_boot_count(2);
        engine.correct_with_network_time(1_700_000_100_000, "ntp");

        // Same boot id/count as the corrected reboot.
        let verdict = engine.initialize("boot-b", 2, true);

        assert!(!verdict.is_rebooted);
        assert_eq!(verdict.reliability_value, 100);
    }

    #[test]
    fn correction_resyncs_baseline_from_signals() {
        let (engine, store, signals) = make_engine();
        signals.set_boot_id("boot-live");
        signals.set_boot_count(7);

        engine.initialize("boot-a", 1, true);
        engine.correct_with_network_time(1_700_000_000_000, "ntp");

        let record = store.load().unwrap();
        assert_eq!(record.last_boot_id, "boot-live");
        assert_eq!(record.last_boot_count, 7);
    }

    #[test]
    fn skew_beyond_threshold_flags_cheating_with_reason() {
        let (engine, _, signals) = make_engine();
        signals.set_system_time(65_000);
        signals.set_elapsed_realtime(5_000);

        engine.initialize("boot-a", 1, true);
        engine.correct_with_network_time(1_000, "ntp");
        // Pull the stored network time apart from the clock.
        let verdict = engine.check_cheating();

        assert_eq!(verdict.time_skew, 64_000);
        assert!(verdict.is_cheating_time);
        assert!(verdict.cheating_reason.contains("64000ms > 60000ms"));
    }

    #[test]
    fn skew_is_zero_without_network_time() {
        let (engine, _, signals) = make_engine();
        signals.set_system_time(9_999_999_999);

        engine.initialize("boot-a", 1, true);
        let verdict = engine.check_cheating();

        assert_eq!(verdict.time_skew, 0);
        assert_eq!(verdict.network_real_time, 0);
    }

    #[test]
    fn pending_events_with_auto_time_off_flag_cheating() {
        let (engine, _, signals) = make_engine();
        signals.set_auto_settings(0, 1);

        // First run offline: score 70, cleared pending.
        engine.initialize("boot-a", 1, false);
        let verdict = engine.check_cheating();

        assert!(verdict.is_cheating_time);
        assert!(verdict.is_auto_time_off);
        assert!(verdict
            .cheating_reason
            .starts_with("Suspicious: (rebooted=false/cleared=true)"));
        assert!(verdict.cheating_reason.ends_with("score=70"));
    }

    #[test]
    fn pending_events_with_auto_time_on_stay_clean() {
        let (engine, _, signals) = make_engine();
        signals.set_auto_settings(1, 1);

        engine.initialize("boot-a", 1, false);
        let verdict = engine.check_cheating();

        assert!(!verdict.is_cheating_time);
        assert!(verdict.cheating_reason.is_empty());
    }

    #[test]
    fn healthy_score_overrides_pending_events() {
        let (engine, _, signals) = make_engine();
        signals.set_auto_settings(0, 0);

        // Online first run: 100 - 15 = 85 with cleared pending, then the
        // correction brings it back to 100 and clears the event.
        engine.initialize("boot-a", 1, true);
        engine.correct_with_network_time(signals.system_time_ms(), "ntp");

        let verdict = engine.check_cheating();
        assert_eq!(verdict.reliability_value, 100);
        assert!(!verdict.is_cheating_time);
    }

    #[test]
    fn cheating_reason_guard_mirrors_the_verdict_condition() {
        // Known quirk: the reason's guard restates the cheating condition,
        // so every non-skew cheating state observed here carries a reason.
        // An empty reason on a cheating verdict is representable (the
        // verdict and the guard are evaluated independently) and must not
        // be "fixed" into a single shared expression.
        let (engine, _, signals) = make_engine();
        signals.set_auto_settings(-1, -1);

        engine.initialize("boot-a", 1, false);
        let verdict = engine.check_cheating();

        assert!(verdict.is_cheating_time);
        assert!(
            !verdict.cheating_reason.is_empty(),
            "compound path carries its reason while the guards stay in sync"
        );
    }

    #[test]
    fn save_failure_keeps_memory_state_authoritative() {
        let signals = Arc::new(FixedSignals::new());
        let engine = TimeReliabilityEngine::new(Arc::new(FailingStore), signals);

        let verdict = engine.initialize("boot-a", 1, true);
        assert_eq!(verdict.reliability_value, 85);

        // The engine keeps scoring off its in-memory record.
        let corrected = engine.correct_with_network_time(1_700_000_000_000, "ntp");
        assert_eq!(corrected.reliability_value, 100);
    }

    #[test]
    fn state_survives_engine_restart_via_store() {
        let store = Arc::new(MemoryStore::new());
        let signals = Arc::new(FixedSignals::new());

        let engine = TimeReliabilityEngine::new(store.clone(), signals.clone());
        engine.initialize("boot-a", 1, true);
        engine.correct_with_network_time(1_700_000_000_000, "ntp");

        // New engine over the same store: no clear, no reboot, score kept.
        let engine = TimeReliabilityEngine::new(store, signals);
        let verdict = engine.initialize("boot-a", 1, true);

        assert!(!verdict.is_first_run);
        assert!(!verdict.is_cleared);
        assert!(!verdict.is_rebooted);
        assert_eq!(verdict.reliability_value, 100);
    }

    #[test]
    fn telemetry_projects_record_and_live_signals() {
        let (engine, _, signals) = make_engine();
        signals.set_boot_id("boot-live");
        signals.set_time_zone_id("Asia/Ho_Chi_Minh");
        signals.set_time_zone_offset(7 * 3_600_000);

        engine.initialize("boot-a", 3, true);
        let snapshot = engine.telemetry();

        assert_eq!(snapshot.boot_id, "boot-live");
        assert_eq!(snapshot.last_boot_id, "boot-a");
        assert_eq!(snapshot.last_boot_count, 3);
        assert_eq!(snapshot.reliability_value, 85);
        assert_eq!(snapshot.time_zone, "Asia/Ho_Chi_Minh");
        assert_eq!(snapshot.time_zone_offset, 25_200_000);
        assert_eq!(
            snapshot.boot_start_time,
            snapshot.system_time - snapshot.elapsed_realtime
        );
        assert_eq!(snapshot.clock_drift, 0);
    }

    #[test]
    fn clock_drift_stays_zero_while_the_clock_ticks() {
        // One wall-clock read feeds every derived field; a clock that
        // advances on each read must not surface as drift.
        let store = Arc::new(MemoryStore::new());
        let engine = TimeReliabilityEngine::new(store, Arc::new(TickingSignals::new()));
        engine.initialize("boot-a", 1, true);

        let snapshot = engine.telemetry();

        assert_eq!(snapshot.calculated_time, snapshot.system_time);
        assert_eq!(snapshot.clock_drift, 0);
    }

    #[test]
    fn telemetry_does_not_mutate_state() {
        let (engine, store, _) = make_engine();
        engine.initialize("boot-a", 1, true);
        let before = store.load().unwrap();

        engine.telemetry();
        engine.check_cheating();

        assert_eq!(store.load().unwrap(), before);
    }
}
