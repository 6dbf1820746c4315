//! Configuration for the guard facade.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for PunchGuard.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Directory for the persisted reliability record. `None` keeps the
    /// record in memory only.
    pub storage_dir: Option<PathBuf>,
    /// Smallest interval a host should request position updates at.
    pub min_update_interval: Duration,
    /// Smallest displacement a host should request position updates for.
    pub min_displacement_m: f64,
    /// Client label stamped on verdicts; "native" maps to the native
    /// source tag, anything else to fused.
    pub client_name: String,
    /// Master switch for location evaluation.
    pub location_check_enabled: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            min_update_interval: Duration::from_millis(5000),
            min_displacement_m: 10.0,
            client_name: "native".into(),
            location_check_enabled: true,
        }
    }
}
