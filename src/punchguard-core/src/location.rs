//! Per-sample location trust scoring.
//!
//! One sample in, one verdict out. Scoring starts at 100 and applies fixed
//! deductions; classification and the four derived booleans come from
//! separate thresholds on the same figure. The evaluator keeps the most
//! recent verdict as a cache for "last known" queries and records each
//! sample's mock flag into a process-shared advisory boolean.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::signals::DeviceSignals;
use crate::types::{
    LocationProvider, LocationSample, LocationSource, LocationStatus, LocationVerdict, RefreshKind,
};

/// Score deducted when the OS flags a mock provider.
pub const MOCK_PROVIDER_PENALTY: i32 = 100;

/// Score deducted when a GPS fix reports zero satellites.
pub const NO_SATELLITES_PENALTY: i32 = 50;

/// Score deducted when a fix used a weak satellite set.
pub const LOW_SATELLITES_PENALTY: i32 = 20;

/// Score deducted when a fix carries no altitude.
pub const NO_ALTITUDE_PENALTY: i32 = 5;

/// Satellite count below which a non-empty fix is considered weak.
pub const LOW_SATELLITE_THRESHOLD: u32 = 4;

/// Raw score above which a verdict counts as usable.
pub const VALID_THRESHOLD: i32 = 30;

/// Raw score at or above which a verdict counts as trusted.
pub const TRUSTED_THRESHOLD: i32 = 80;

/// Raw score below which a verdict counts as suspicious.
pub const SUSPICIOUS_THRESHOLD: i32 = 50;

/// Process-shared "last sample was mocked" flag.
///
/// Advisory telemetry with last-writer-wins semantics: every evaluation
/// stores, the security report loads, and no reader performs a
/// read-modify-write. Clone the handle into each consumer.
#[derive(Debug, Clone, Default)]
pub struct MockFlag(Arc<AtomicBool>);

impl MockFlag {
    /// Create an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the mock flag of the most recently evaluated sample.
    pub fn set(&self, mocked: bool) {
        self.0.store(mocked, Ordering::Relaxed);
    }

    /// Read the most recently recorded value.
    #[must_use]
    pub fn get(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Converts raw positioning samples into graded trust verdicts.
pub struct LocationTrustEvaluator {
    client_name: String,
    mock_flag: MockFlag,
    signals: Arc<dyn DeviceSignals>,
    last_verdict: RwLock<Option<LocationVerdict>>,
}

impl LocationTrustEvaluator {
    /// Create an evaluator for the given client label.
    pub fn new(client_name: &str, mock_flag: MockFlag, signals: Arc<dyn DeviceSignals>) -> Self {
        Self {
            client_name: client_name.to_string(),
            mock_flag,
            signals,
            last_verdict: RwLock::new(None),
        }
    }

    /// Score a sample arriving through the regular update callback.
    pub fn evaluate(&self, sample: &LocationSample) -> LocationVerdict {
        self.evaluate_with_refresh(sample, RefreshKind::Normal)
    }

    /// Score a sample with an explicit refresh classification.
    pub fn evaluate_with_refresh(
        &self,
        sample: &LocationSample,
        refresh: RefreshKind,
    ) -> LocationVerdict {
        let system_time = self.signals.system_time_ms();

        // The guard runs before the mock-flag side effect: a sample with no
        // position never touches shared state.
        if sample.has_null_coordinates() {
            warn!("Location: sample rejected, null coordinates");
            let verdict = LocationVerdict::invalid_coordinates(sample, system_time);
            *self.last_verdict.write() = Some(verdict.clone());
            return verdict;
        }

        self.mock_flag.set(sample.from_mock_provider);

        let mut score = 100i32;
        let mut warnings = Vec::new();

        if sample.from_mock_provider {
            score -= MOCK_PROVIDER_PENALTY;
            warnings.push("CRITICAL: Mock location provider detected.".to_string());
        }

        if sample.provider == LocationProvider::Gps && sample.satellites == 0 {
            score -= NO_SATELLITES_PENALTY;
            warnings.push("WARNING: GPS provider but no satellites.".to_string());
        } else if sample.satellites > 0 && sample.satellites < LOW_SATELLITE_THRESHOLD {
            score -= LOW_SATELLITES_PENALTY;
            warnings.push("WARNING: Low satellite count.".to_string());
        }

        if sample.altitude.map_or(true, |a| a == 0.0) {
            score -= NO_ALTITUDE_PENALTY;
            warnings.push("NOTICE: No altitude data.".to_string());
        }

        // Derived flags read the unclamped figure; the stored score is
        // clamped to zero.
        let is_valid = score > VALID_THRESHOLD;
        let is_trusted = score >= TRUSTED_THRESHOLD;
        let is_suspicious = score < SUSPICIOUS_THRESHOLD;
        let is_fake = score <= 0 || sample.from_mock_provider;

        let status = if is_fake {
            LocationStatus::Fake
        } else if score < SUSPICIOUS_THRESHOLD {
            LocationStatus::Suspicious
        } else {
            LocationStatus::Valid
        };

        if !warnings.is_empty() {
            debug!(
                score = score.max(0),
                status = status.code(),
                warning_count = warnings.len(),
                "Location: sample penalized"
            );
        }

        let verdict = LocationVerdict {
            is_valid,
            error: None,
            is_from_mock_provider: sample.from_mock_provider,
            satellites: sample.satellites,
            latitude: sample.latitude,
            longitude: sample.longitude,
            altitude: sample.altitude,
            has_altitude: sample.altitude.is_some(),
            speed: sample.speed_mps.unwrap_or(0.0) * 3.6,
            speed_mps: sample.speed_mps.unwrap_or(0.0),
            accuracy: sample.accuracy,
            bearing: sample.bearing.unwrap_or(0.0),
            has_bearing: sample.bearing.is_some(),
            provider: sample.provider,
            location_client_name: self.client_name.clone(),
            source: LocationSource::from_client_name(&self.client_name),
            gps_time: sample.fix_time_ms,
            system_time,
            trust_score: score.max(0),
            warnings,
            is_trusted,
            is_suspicious,
            is_fake,
            status,
            refresh,
        };

        *self.last_verdict.write() = Some(verdict.clone());
        verdict
    }

    /// Return the cached verdict re-tagged as a cache read.
    ///
    /// `None` until the first evaluation. The cache holds exactly the most
    /// recent verdict; it is overwritten on every evaluation and never
    /// merged or averaged.
    #[must_use]
    pub fn last_known(&self) -> Option<LocationVerdict> {
        let mut verdict = self.last_verdict.read().clone()?;
        verdict.refresh = RefreshKind::Cache;
        verdict.source = LocationSource::Cached;
        Some(verdict)
    }
}
