//! Device signal acquisition with sentinel degradation.
//!
//! Every reading the evaluators need from the platform comes through the
//! [`DeviceSignals`] trait so hosts can substitute their own source. A
//! signal the platform cannot provide degrades to a sentinel (empty string
//! for ids, -1 for counters and settings) instead of an error; the
//! evaluators treat sentinels as "no signal", never as a detection.

use std::sync::atomic::{AtomicI32, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use tracing::debug;

/// Kernel boot id file on Linux and Android.
#[cfg(any(target_os = "linux", target_os = "android"))]
const BOOT_ID_PATH: &str = "/proc/sys/kernel/random/boot_id";

/// Resolved platform signals consumed by the evaluators.
pub trait DeviceSignals: Send + Sync {
    /// Kernel boot id; empty string when the platform offers none.
    fn boot_id(&self) -> String;

    /// Monotonic boot counter; -1 when the platform offers none.
    fn boot_count(&self) -> i32;

    /// Raw auto-time setting; -1 when unavailable. A sentinel reads as
    /// "off" downstream, matching the host settings contract.
    fn auto_time_setting(&self) -> i32;

    /// Raw auto-timezone setting; -1 when unavailable.
    fn auto_time_zone_setting(&self) -> i32;

    /// Wall-clock time, epoch milliseconds.
    fn system_time_ms(&self) -> i64;

    /// Milliseconds since boot (monotonic, survives clock changes).
    fn elapsed_realtime_ms(&self) -> i64;

    /// IANA timezone id; empty string when unresolvable.
    fn time_zone_id(&self) -> String;

    /// Offset from UTC in milliseconds, including any DST shift.
    fn time_zone_offset_ms(&self) -> i64;
}

/// Signals read directly from the local platform.
///
/// Boot id and uptime come from procfs where available; the settings
/// provider has no desktop equivalent, so both auto-time readings stay at
/// their sentinel. Embedded hosts that can resolve them use
/// [`HostSignals`] instead.
pub struct SystemSignals {
    /// Fallback uptime anchor for platforms without a readable procfs.
    started: Instant,
}

impl SystemSignals {
    /// Create a signal source anchored at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceSignals for SystemSignals {
    fn boot_id(&self) -> String {
        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            match std::fs::read_to_string(BOOT_ID_PATH) {
                Ok(id) => id.trim().to_string(),
                Err(e) => {
                    debug!("Signals: boot id unavailable ({})", e);
                    String::new()
                },
            }
        }
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        {
            String::new()
        }
    }

    fn boot_count(&self) -> i32 {
        -1
    }

    fn auto_time_setting(&self) -> i32 {
        -1
    }

    fn auto_time_zone_setting(&self) -> i32 {
        -1
    }

    fn system_time_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }

    fn elapsed_realtime_ms(&self) -> i64 {
        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            if let Ok(uptime) = std::fs::read_to_string("/proc/uptime") {
                if let Some(secs) = uptime
                    .split_whitespace()
                    .next()
                    .and_then(|s| s.parse::<f64>().ok())
                {
                    return (secs * 1000.0) as i64;
                }
            }
        }
        self.started.elapsed().as_millis() as i64
    }

    fn time_zone_id(&self) -> String {
        if let Ok(tz) = std::fs::read_to_string("/etc/timezone") {
            let tz = tz.trim();
            if !tz.is_empty() {
                return tz.to_string();
            }
        }
        std::env::var("TZ").unwrap_or_default()
    }

    fn time_zone_offset_ms(&self) -> i64 {
        i64::from(chrono::Local::now().offset().local_minus_utc()) * 1000
    }
}

/// Platform signals with host-pushed overrides.
///
/// Mobile shells resolve the settings provider and boot counter themselves
/// and push the values in whenever they change; clock reads and the boot id
/// fall through to [`SystemSignals`].
pub struct HostSignals {
    base: SystemSignals,
    boot_count: AtomicI32,
    auto_time: AtomicI32,
    auto_time_zone: AtomicI32,
    time_zone_id: RwLock<String>,
}

impl HostSignals {
    /// Create a host-backed source with all overrides at their sentinel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: SystemSignals::new(),
            boot_count: AtomicI32::new(-1),
            auto_time: AtomicI32::new(-1),
            auto_time_zone: AtomicI32::new(-1),
            time_zone_id: RwLock::new(String::new()),
        }
    }

    /// Push the host-resolved boot counter (-1 = unknown).
    pub fn push_boot_count(&self, count: i32) {
        self.boot_count.store(count, Ordering::Relaxed);
    }

    /// Push the host-resolved auto-time and auto-timezone settings.
    pub fn push_settings(&self, auto_time: i32, auto_time_zone: i32) {
        self.auto_time.store(auto_time, Ordering::Relaxed);
        self.auto_time_zone.store(auto_time_zone, Ordering::Relaxed);
    }

    /// Push the host-resolved timezone id.
    pub fn push_time_zone_id(&self, id: &str) {
        *self.time_zone_id.write() = id.to_string();
    }
}

impl Default for HostSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceSignals for HostSignals {
    fn boot_id(&self) -> String {
        self.base.boot_id()
    }

    fn boot_count(&self) -> i32 {
        self.boot_count.load(Ordering::Relaxed)
    }

    fn auto_time_setting(&self) -> i32 {
        self.auto_time.load(Ordering::Relaxed)
    }

    fn auto_time_zone_setting(&self) -> i32 {
        self.auto_time_zone.load(Ordering::Relaxed)
    }

    fn system_time_ms(&self) -> i64 {
        self.base.system_time_ms()
    }

    fn elapsed_realtime_ms(&self) -> i64 {
        self.base.elapsed_realtime_ms()
    }

    fn time_zone_id(&self) -> String {
        let tz = self.time_zone_id.read();
        if tz.is_empty() {
            self.base.time_zone_id()
        } else {
            tz.clone()
        }
    }

    fn time_zone_offset_ms(&self) -> i64 {
        self.base.time_zone_offset_ms()
    }
}

/// Fully deterministic signal source for tests and diagnostics.
pub struct FixedSignals {
    inner: RwLock<FixedValues>,
}

#[derive(Debug, Clone)]
struct FixedValues {
    boot_id: String,
    boot_count: i32,
    auto_time: i32,
    auto_time_zone: i32,
    system_time: i64,
    elapsed_realtime: i64,
    time_zone_id: String,
    time_zone_offset: i64,
}

impl FixedSignals {
    /// A healthy device: stable boot, auto time on, clocks mid-epoch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(FixedValues {
                boot_id: "boot-a".to_string(),
                boot_count: 1,
                auto_time: 1,
                auto_time_zone: 1,
                system_time: 1_700_000_000_000,
                elapsed_realtime: 100_000,
                time_zone_id: "UTC".to_string(),
                time_zone_offset: 0,
            }),
        }
    }

    /// Set the boot id ("" = unavailable).
    pub fn set_boot_id(&self, id: &str) {
        self.inner.write().boot_id = id.to_string();
    }

    /// Set the boot count (-1 = unavailable).
    pub fn set_boot_count(&self, count: i32) {
        self.inner.write().boot_count = count;
    }

    /// Set both auto-time settings.
    pub fn set_auto_settings(&self, auto_time: i32, auto_time_zone: i32) {
        let mut inner = self.inner.write();
        inner.auto_time = auto_time;
        inner.auto_time_zone = auto_time_zone;
    }

    /// Pin the wall clock.
    pub fn set_system_time(&self, ms: i64) {
        self.inner.write().system_time = ms;
    }

    /// Pin the monotonic clock.
    pub fn set_elapsed_realtime(&self, ms: i64) {
        self.inner.write().elapsed_realtime = ms;
    }

    /// Advance both clocks together.
    pub fn advance(&self, delta_ms: i64) {
        let mut inner = self.inner.write();
        inner.system_time += delta_ms;
        inner.elapsed_realtime += delta_ms;
    }

    /// Set the timezone id.
    pub fn set_time_zone_id(&self, id: &str) {
        self.inner.write().time_zone_id = id.to_string();
    }

    /// Set the UTC offset in milliseconds.
    pub fn set_time_zone_offset(&self, offset_ms: i64) {
        self.inner.write().time_zone_offset = offset_ms;
    }
}

impl Default for FixedSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceSignals for FixedSignals {
    fn boot_id(&self) -> String {
        self.inner.read().boot_id.clone()
    }

    fn boot_count(&self) -> i32 {
        self.inner.read().boot_count
    }

    fn auto_time_setting(&self) -> i32 {
        self.inner.read().auto_time
    }

    fn auto_time_zone_setting(&self) -> i32 {
        self.inner.read().auto_time_zone
    }

    fn system_time_ms(&self) -> i64 {
        self.inner.read().system_time
    }

    fn elapsed_realtime_ms(&self) -> i64 {
        self.inner.read().elapsed_realtime
    }

    fn time_zone_id(&self) -> String {
        self.inner.read().time_zone_id.clone()
    }

    fn time_zone_offset_ms(&self) -> i64 {
        self.inner.read().time_zone_offset
    }
}
