//! Verdict, sample, and snapshot types shared across the guard core.
//!
//! Everything here serializes to flat camelCase JSON objects with primitive
//! values; the keys are the contract consumed by the host application.
//! Classification enums carry integer wire codes for the same reason.

use serde::{Deserialize, Serialize};

/// Positioning subsystem that produced a fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationProvider {
    /// Satellite positioning ("gps").
    Gps,
    /// Cell/wifi positioning ("network").
    Network,
    /// Any other provider (fused, passive, test).
    #[serde(other)]
    Other,
}

/// Classification of a scored location sample.
///
/// Wire codes: VALID = 0, SUSPICIOUS = 1, FAKE = 2, NO_LOCATION = 3,
/// UNKNOWN = -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationStatus {
    /// Sample passed scoring with a healthy score.
    Valid,
    /// Sample scored below the suspicion threshold.
    Suspicious,
    /// Sample is mocked or scored out entirely.
    Fake,
    /// No usable sample (invalid coordinates).
    NoLocation,
    /// Not classified.
    Unknown,
}

impl LocationStatus {
    /// Integer wire code for the host contract.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Valid => 0,
            Self::Suspicious => 1,
            Self::Fake => 2,
            Self::NoLocation => 3,
            Self::Unknown => -1,
        }
    }

    /// Map a wire code back to a status; unknown codes map to `Unknown`.
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Valid,
            1 => Self::Suspicious,
            2 => Self::Fake,
            3 => Self::NoLocation,
            _ => Self::Unknown,
        }
    }
}

impl Serialize for LocationStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for LocationStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self::from_code(i32::deserialize(deserializer)?))
    }
}

/// How a verdict was produced relative to the host's refresh request.
///
/// Wire codes: CACHE = 0, FORCE = 1, NORMAL = 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshKind {
    /// Served from the evaluator cache or re-evaluated stale coordinates.
    Cache,
    /// Produced by a host-forced single update.
    Force,
    /// Produced by the regular update callback.
    Normal,
}

impl RefreshKind {
    /// Integer wire code for the host contract.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Cache => 0,
            Self::Force => 1,
            Self::Normal => 2,
        }
    }

    /// Map a wire code back to a refresh kind; unknown codes map to `Normal`.
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Cache,
            1 => Self::Force,
            _ => Self::Normal,
        }
    }
}

impl Serialize for RefreshKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for RefreshKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self::from_code(i32::deserialize(deserializer)?))
    }
}

/// Which client pipeline a verdict came from.
///
/// Wire codes: CACHED = 0, FUSED = 1, NATIVE = 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    /// Replayed from previously seen coordinates.
    Cached,
    /// Platform fused location client.
    Fused,
    /// Native GPS/network manager client.
    Native,
}

impl LocationSource {
    /// Integer wire code for the host contract.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Cached => 0,
            Self::Fused => 1,
            Self::Native => 2,
        }
    }

    /// Map a wire code back to a source; unknown codes map to `Cached`.
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            2 => Self::Native,
            1 => Self::Fused,
            _ => Self::Cached,
        }
    }

    /// Classify a configured client name.
    #[must_use]
    pub fn from_client_name(name: &str) -> Self {
        if name == "native" {
            Self::Native
        } else {
            Self::Fused
        }
    }
}

impl Serialize for LocationSource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for LocationSource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self::from_code(i32::deserialize(deserializer)?))
    }
}

/// One raw positioning sample supplied by the host's location subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSample {
    /// Latitude in degrees.
    pub latitude: f64,

    /// Longitude in degrees.
    pub longitude: f64,

    /// Altitude in meters, when the fix carried one.
    #[serde(default)]
    pub altitude: Option<f64>,

    /// Ground speed in meters per second, when known.
    #[serde(default)]
    pub speed_mps: Option<f64>,

    /// Bearing in degrees, when known.
    #[serde(default)]
    pub bearing: Option<f64>,

    /// Horizontal accuracy radius in meters.
    #[serde(default)]
    pub accuracy: f64,

    /// Provider that produced the fix.
    pub provider: LocationProvider,

    /// Satellites used in the fix; 0 means unknown.
    #[serde(default)]
    pub satellites: u32,

    /// Whether the OS flagged the fix as coming from a mock provider.
    #[serde(default)]
    pub from_mock_provider: bool,

    /// Fix timestamp, epoch milliseconds.
    #[serde(default)]
    pub fix_time_ms: i64,
}

impl LocationSample {
    /// A sample at (0,0) carries no usable position.
    #[must_use]
    pub fn has_null_coordinates(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

/// Scored trust verdict for one location sample.
///
/// The four booleans are computed from independent thresholds and overlap
/// deliberately (a score of 45 is valid and suspicious at the same time);
/// downstream consumers read them individually, so they are kept alongside
/// the status enum instead of being merged into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationVerdict {
    /// Whether the sample was usable at all (score above the validity
    /// threshold and coordinates present).
    pub is_valid: bool,

    /// Present only for rejected samples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Mock-provider flag echoed from the sample.
    pub is_from_mock_provider: bool,

    /// Satellite count echoed from the sample.
    pub satellites: u32,

    /// Latitude in degrees.
    pub latitude: f64,

    /// Longitude in degrees.
    pub longitude: f64,

    /// Altitude in meters, when the fix carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,

    /// Whether the fix carried an altitude.
    pub has_altitude: bool,

    /// Ground speed in km/h, derived from the raw m/s figure.
    pub speed: f64,

    /// Ground speed in m/s as reported.
    pub speed_mps: f64,

    /// Horizontal accuracy radius in meters.
    pub accuracy: f64,

    /// Bearing in degrees; 0 when unknown.
    pub bearing: f64,

    /// Whether the fix carried a bearing.
    pub has_bearing: bool,

    /// Provider that produced the fix.
    pub provider: LocationProvider,

    /// Configured client label that delivered the fix.
    pub location_client_name: String,

    /// Client pipeline classification.
    pub source: LocationSource,

    /// Fix timestamp, epoch milliseconds.
    pub gps_time: i64,

    /// Wall-clock time at evaluation, epoch milliseconds.
    pub system_time: i64,

    /// Trust score clamped to [0,100].
    pub trust_score: i32,

    /// Human-readable warning for every penalty that fired, in rule order.
    pub warnings: Vec<String>,

    /// Score at or above the trusted threshold.
    pub is_trusted: bool,

    /// Score below the suspicion threshold.
    pub is_suspicious: bool,

    /// Mocked or scored out entirely.
    pub is_fake: bool,

    /// Priority classification of the sample.
    pub status: LocationStatus,

    /// How this verdict was produced.
    #[serde(rename = "refreshType")]
    pub refresh: RefreshKind,
}

impl LocationVerdict {
    /// Verdict for a sample rejected before scoring.
    ///
    /// Only `is_valid`, `error`, and `status` carry meaning; the score stays
    /// 0 with status `NoLocation` so the host can tell "nothing usable"
    /// apart from a scored-to-zero FAKE.
    #[must_use]
    pub fn invalid_coordinates(sample: &LocationSample, system_time: i64) -> Self {
        Self {
            is_valid: false,
            error: Some("Invalid coordinates (0,0)".to_string()),
            is_from_mock_provider: sample.from_mock_provider,
            satellites: sample.satellites,
            latitude: sample.latitude,
            longitude: sample.longitude,
            altitude: None,
            has_altitude: false,
            speed: 0.0,
            speed_mps: 0.0,
            accuracy: sample.accuracy,
            bearing: 0.0,
            has_bearing: false,
            provider: sample.provider,
            location_client_name: String::new(),
            source: LocationSource::Cached,
            gps_time: sample.fix_time_ms,
            system_time,
            trust_score: 0,
            warnings: Vec::new(),
            is_trusted: false,
            is_suspicious: false,
            is_fake: false,
            status: LocationStatus::NoLocation,
            refresh: RefreshKind::Normal,
        }
    }
}

/// Result of one `initialize` pass over the reliability state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInitVerdict {
    /// Reliability score after this pass, [0,100].
    pub reliability_value: i32,

    /// A reboot has been detected and not yet corrected.
    pub is_rebooted: bool,

    /// A data clear (or first run) has been detected and not yet corrected.
    pub is_cleared: bool,

    /// The reboot penalty has been charged for the current event.
    pub reboot_penalty_applied: bool,

    /// The clear penalty has been charged for the current event.
    pub clear_penalty_applied: bool,

    /// This pass saw a state with no time baseline at all.
    pub is_first_run: bool,

    /// Boot id supplied to this pass.
    pub current_boot_id: String,

    /// Boot id remembered from the previous baseline.
    pub last_boot_id: String,

    /// Boot count supplied to this pass.
    pub current_boot_count: i32,

    /// Boot count remembered from the previous baseline.
    pub last_boot_count: i32,

    /// Network availability as reported by the host.
    pub is_network_connected: bool,

    /// Raw auto-time setting (-1 when unavailable).
    pub auto_time_switch: i32,

    /// Raw auto-timezone setting (-1 when unavailable).
    pub auto_time_zone_switch: i32,

    /// Auto time is off or unreadable.
    pub is_auto_time_off: bool,

    /// Auto timezone is off or unreadable.
    pub is_auto_time_zone_off: bool,

    /// Wall-clock time at this pass, epoch milliseconds.
    pub system_time: i64,

    /// Milliseconds since boot at this pass.
    pub elapsed_realtime: i64,

    /// Wall-clock instant the device booted (`system_time - elapsed_realtime`).
    pub boot_start_time: i64,

    /// Last stored network time, epoch milliseconds (0 = never).
    pub network_real_time: i64,

    /// Last legal-time baseline, epoch milliseconds (0 = never).
    pub last_legal_time: i64,
}

/// Result of a network-time correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeCorrectionVerdict {
    /// Reliability score after the correction, [0,100].
    pub reliability_value: i32,

    /// Reboot flag after the correction (always cleared by it).
    pub is_rebooted: bool,

    /// Clear flag after the correction (always cleared by it).
    pub is_cleared: bool,

    /// Network time just stored, epoch milliseconds.
    pub network_real_time: i64,

    /// Legal-time baseline after the correction, epoch milliseconds.
    pub last_legal_time: i64,

    /// Label of the time source that supplied the correction.
    pub source: String,
}

/// Point-in-time cheating verdict from the reliability engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheatingVerdict {
    /// The current clock reading cannot be trusted.
    pub is_cheating_time: bool,

    /// Why, when a reason branch matched; may be empty even when cheating.
    pub cheating_reason: String,

    /// Current reliability score, [0,100].
    pub reliability_value: i32,

    /// `|system_time - network_real_time|`, 0 when no network time is known.
    pub time_skew: i64,

    /// Wall-clock time at evaluation, epoch milliseconds.
    pub system_time: i64,

    /// Milliseconds since boot at evaluation.
    pub elapsed_realtime: i64,

    /// Wall-clock instant the device booted.
    pub boot_start_time: i64,

    /// Boot start re-projected to now (`boot_start_time + elapsed_realtime`).
    pub boot_correct_time: i64,

    /// Last stored network time, epoch milliseconds (0 = never).
    pub network_real_time: i64,

    /// Raw auto-time setting (-1 when unavailable).
    pub auto_time_switch: i32,

    /// Raw auto-timezone setting (-1 when unavailable).
    pub auto_time_zone_switch: i32,

    /// Auto time is off or unreadable.
    pub is_auto_time_off: bool,

    /// Auto timezone is off or unreadable.
    pub is_auto_time_zone_off: bool,

    /// Auto time is on (setting > 0).
    pub auto_time_enabled: bool,

    /// Auto timezone is on (setting > 0).
    pub auto_time_zone_enabled: bool,

    /// Uncorrected reboot pending.
    pub is_rebooted: bool,

    /// Uncorrected clear pending.
    pub is_cleared: bool,

    /// Reboot penalty latch state.
    pub reboot_penalty_applied: bool,

    /// Clear penalty latch state.
    pub clear_penalty_applied: bool,
}

/// Read-only projection of the reliability engine plus live device signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    /// Live boot id ("" when the platform offers none).
    pub boot_id: String,

    /// Boot id remembered in the persisted baseline.
    pub last_boot_id: String,

    /// Live boot count (-1 when the platform offers none).
    pub boot_count: i32,

    /// Boot count remembered in the persisted baseline.
    pub last_boot_count: i32,

    /// Raw auto-time setting (-1 when unavailable).
    pub auto_time_switch: i32,

    /// Raw auto-timezone setting (-1 when unavailable).
    pub auto_time_zone_switch: i32,

    /// Milliseconds since boot.
    pub elapsed_realtime: i64,

    /// Wall-clock time, epoch milliseconds.
    pub system_time: i64,

    /// Wall-clock instant the device booted.
    pub boot_start_time: i64,

    /// Last stored network time, epoch milliseconds (0 = never).
    pub network_real_time: i64,

    /// Last legal-time baseline, epoch milliseconds (0 = never).
    pub last_legal_time: i64,

    /// Current reliability score, [0,100].
    pub reliability_value: i32,

    /// Uncorrected reboot pending.
    pub is_rebooted: bool,

    /// Uncorrected clear pending.
    pub is_cleared: bool,

    /// Boot start re-projected to now.
    pub calculated_time: i64,

    /// `system_time - calculated_time`. One clock read feeds the whole
    /// snapshot, so this is always 0.
    pub clock_drift: i64,

    /// Timezone id ("" when unresolvable).
    pub time_zone: String,

    /// Offset from UTC in milliseconds.
    pub time_zone_offset: i64,
}

/// Root/emulator indicator scan result plus the live mock flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityReport {
    /// A root indicator was found on disk.
    pub rooted: bool,

    /// Which indicator tripped, when one did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_method: Option<String>,

    /// An emulator giveaway file was found.
    pub emulator: bool,

    /// The most recently evaluated sample came from a mock provider.
    pub mock_location_active: bool,

    /// Operating system name.
    pub os: String,

    /// CPU architecture.
    pub arch: String,
}

/// Local timezone description for host telemetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimezoneReport {
    /// IANA timezone id ("" when unresolvable).
    pub id: String,

    /// Offset from UTC in milliseconds, including any DST shift.
    pub offset_millis: i64,

    /// Daylight saving currently in effect.
    pub dst_active: bool,
}
