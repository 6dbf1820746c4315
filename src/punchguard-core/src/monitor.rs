//! Guard facade.
//!
//! Single entry point wiring the two evaluators together: the stateless
//! location scorer and the persisted clock reliability engine, sharing
//! one mock-provider flag and one signal source. Hosts construct a
//! monitor once and route every event through it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Datelike, Local, TimeZone};
use tracing::{debug, warn};

use crate::config::GuardConfig;
use crate::location::{LocationTrustEvaluator, MockFlag};
use crate::security::SecurityScanner;
use crate::signals::{DeviceSignals, SystemSignals};
use crate::store::{FileStore, MemoryStore, StateStore};
use crate::time_trust::TimeReliabilityEngine;
use crate::types::{
    CheatingVerdict, LocationSample, LocationVerdict, RefreshKind, SecurityReport,
    TelemetrySnapshot, TimeCorrectionVerdict, TimeInitVerdict, TimezoneReport,
};

/// Cheap pre-filter for the null island sentinel a broken fix reports.
/// The evaluator is the real check; hosts call this before persisting.
#[must_use]
pub fn mock_location_from_coords(latitude: f64, longitude: f64) -> bool {
    latitude == 0.0 && longitude == 0.0
}

/// Owns both evaluators and the shared device state.
pub struct AntiCheatMonitor {
    evaluator: LocationTrustEvaluator,
    engine: TimeReliabilityEngine,
    scanner: SecurityScanner,
    mock_flag: MockFlag,
    signals: Arc<dyn DeviceSignals>,
    /// Remote kill switch; checks run only while enabled and not bypassed.
    location_check_enabled: AtomicBool,
    location_check_bypassed: AtomicBool,
}

impl AntiCheatMonitor {
    /// Monitor over the live platform: real clocks, and a file-backed
    /// record when the config names a storage directory.
    #[must_use]
    pub fn new(config: GuardConfig) -> Self {
        let signals: Arc<dyn DeviceSignals> = Arc::new(SystemSignals::new());
        let store: Arc<dyn StateStore> = match &config.storage_dir {
            Some(dir) => Arc::new(FileStore::new(dir.clone())),
            None => Arc::new(MemoryStore::new()),
        };
        Self::with_parts(config, signals, store)
    }

    /// Monitor over caller-supplied signals and store.
    #[must_use]
    pub fn with_parts(
        config: GuardConfig,
        signals: Arc<dyn DeviceSignals>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        let mock_flag = MockFlag::new();
        let evaluator =
            LocationTrustEvaluator::new(&config.client_name, mock_flag.clone(), signals.clone());
        let engine = TimeReliabilityEngine::new(store, signals.clone());

        debug!(
            client = %config.client_name,
            location_checks = config.location_check_enabled,
            "Monitor: constructed"
        );

        Self {
            evaluator,
            engine,
            scanner: SecurityScanner::new(),
            mock_flag,
            signals,
            location_check_enabled: AtomicBool::new(config.location_check_enabled),
            location_check_bypassed: AtomicBool::new(false),
        }
    }

    /// Run the process-start pass with signal-sourced boot identity.
    pub fn start(&self, network_available: bool) -> TimeInitVerdict {
        let boot_id = self.signals.boot_id();
        let boot_count = self.signals.boot_count();
        self.start_with_boot(&boot_id, boot_count, network_available)
    }

    /// Run the process-start pass with host-supplied boot identity.
    pub fn start_with_boot(
        &self,
        boot_id: &str,
        boot_count: i32,
        network_available: bool,
    ) -> TimeInitVerdict {
        self.engine.initialize(boot_id, boot_count, network_available)
    }

    /// Score a fresh position fix.
    pub fn on_location_update(&self, sample: &LocationSample) -> LocationVerdict {
        self.evaluator.evaluate(sample)
    }

    /// Score a host-forced refresh.
    pub fn on_forced_update(&self, sample: &LocationSample) -> LocationVerdict {
        self.evaluator.evaluate_with_refresh(sample, RefreshKind::Force)
    }

    /// Last evaluated position, retagged as served-from-cache. With a
    /// cold cache the fresher of the two raw candidates is scored first;
    /// on equal timestamps the network fix wins.
    pub fn last_known_location(
        &self,
        gps_candidate: Option<&LocationSample>,
        network_candidate: Option<&LocationSample>,
    ) -> Option<LocationVerdict> {
        if let Some(verdict) = self.evaluator.last_known() {
            return Some(verdict);
        }

        let candidate = match (gps_candidate, network_candidate) {
            (Some(g), Some(n)) => Some(if g.fix_time_ms > n.fix_time_ms { g } else { n }),
            (Some(g), None) => Some(g),
            (None, Some(n)) => Some(n),
            (None, None) => None,
        }?;

        self.evaluator.evaluate(candidate);
        self.evaluator.last_known()
    }

    /// Apply an externally trusted time reading to the clock engine.
    pub fn correct_with_network_time(
        &self,
        network_time: i64,
        source: &str,
    ) -> TimeCorrectionVerdict {
        self.engine.correct_with_network_time(network_time, source)
    }

    /// Current clock reliability score, [0,100].
    #[must_use]
    pub fn time_reliability(&self) -> i32 {
        self.engine.reliability_value()
    }

    /// Evaluate the clock state. Pure read.
    #[must_use]
    pub fn check_cheating(&self) -> CheatingVerdict {
        self.engine.check_cheating()
    }

    /// Project the clock record plus live signals. Pure read.
    #[must_use]
    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.engine.telemetry()
    }

    /// Structured log hook for anomalies the host spotted itself.
    pub fn report_time_anomaly(&self, reason: &str, detail: &str) {
        warn!(reason, detail, "Monitor: host reported time anomaly");
    }

    /// Whether location checks should run right now.
    #[must_use]
    pub fn location_check_active(&self) -> bool {
        self.location_check_enabled.load(Ordering::Relaxed)
            && !self.location_check_bypassed.load(Ordering::Relaxed)
    }

    /// Remote kill switch.
    pub fn set_location_check_enabled(&self, enabled: bool) {
        self.location_check_enabled.store(enabled, Ordering::Relaxed);
    }

    /// Host-side bypass, for allowlisted builds.
    pub fn set_bypassed(&self, bypassed: bool) {
        self.location_check_bypassed.store(bypassed, Ordering::Relaxed);
    }

    /// Mock-provider flag from the most recent scored sample.
    #[must_use]
    pub fn mock_location_detected(&self) -> bool {
        self.mock_flag.get()
    }

    /// Filesystem integrity scan folded with the live mock flag.
    #[must_use]
    pub fn security_report(&self) -> SecurityReport {
        self.scanner.report(self.mock_flag.get())
    }

    /// Timezone identity as the host should stamp it on punches.
    #[must_use]
    pub fn timezone_report(&self) -> TimezoneReport {
        TimezoneReport {
            id: self.signals.time_zone_id(),
            offset_millis: self.signals.time_zone_offset_ms(),
            dst_active: local_dst_active(),
        }
    }
}

/// Whether the local zone is currently shifted off its standard offset.
/// Comparing against the smaller of the January and July offsets covers
/// both hemispheres.
fn local_dst_active() -> bool {
    let now = Local::now();
    let year = now.year();
    let offset_at = |month: u32| {
        Local
            .with_ymd_and_hms(year, month, 1, 12, 0, 0)
            .single()
            .map(|dt| dt.offset().local_minus_utc())
    };
    match (offset_at(1), offset_at(7)) {
        (Some(jan), Some(jul)) => now.offset().local_minus_utc() > jan.min(jul),
        _ => false,
    }
}
