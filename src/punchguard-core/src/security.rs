//! Device integrity probes.
//!
//! Filesystem existence checks only, no scoring: su binaries at the
//! well-known paths, root manager app directories, emulator giveaway
//! files. A hit means hardware-backed guarantees cannot be assumed, not
//! that the operator is hostile.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::types::SecurityReport;

/// su binaries that only count when they carry the execute bit.
const SU_EXEC_PATHS: [&str; 2] = ["/system/bin/su", "/system/xbin/su"];

/// su binaries where existence alone is the indicator.
const SU_PROBE_PATHS: [&str; 6] = [
    "/sbin/su",
    "/system/sd/xbin/su",
    "/system/bin/failsafe/su",
    "/data/local/xbin/su",
    "/data/local/bin/su",
    "/data/local/su",
];

/// Root manager installations.
const ROOT_APP_PATHS: [&str; 4] = [
    "/data/adb/magisk",
    "/sbin/.magisk",
    "/data/data/com.topjohnwu.magisk",
    "/data/data/eu.chainfire.supersu",
];

/// Files only present inside an emulated environment.
const EMULATOR_PATHS: [&str; 5] = [
    "/dev/socket/qemud",
    "/dev/qemu_pipe",
    "/system/lib/libc_malloc_debug_qemu.so",
    "/sys/qemu_trace",
    "/system/bin/qemu-props",
];

/// Probes a fixed set of filesystem paths for root and emulator
/// indicators. The lists are data, so tests swap in paths under a
/// scratch directory.
#[derive(Debug, Clone)]
pub struct SecurityScanner {
    su_exec_paths: Vec<PathBuf>,
    su_probe_paths: Vec<PathBuf>,
    root_app_paths: Vec<PathBuf>,
    emulator_paths: Vec<PathBuf>,
}

impl Default for SecurityScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityScanner {
    /// Scanner over the well-known device paths.
    #[must_use]
    pub fn new() -> Self {
        Self {
            su_exec_paths: SU_EXEC_PATHS.iter().map(PathBuf::from).collect(),
            su_probe_paths: SU_PROBE_PATHS.iter().map(PathBuf::from).collect(),
            root_app_paths: ROOT_APP_PATHS.iter().map(PathBuf::from).collect(),
            emulator_paths: EMULATOR_PATHS.iter().map(PathBuf::from).collect(),
        }
    }

    /// Scanner with every builtin path re-rooted under `dir`.
    #[must_use]
    pub fn scoped_to(dir: &Path) -> Self {
        let reroot = |paths: &[&str]| {
            paths
                .iter()
                .map(|p| dir.join(p.trim_start_matches('/')))
                .collect()
        };
        Self {
            su_exec_paths: reroot(&SU_EXEC_PATHS),
            su_probe_paths: reroot(&SU_PROBE_PATHS),
            root_app_paths: reroot(&ROOT_APP_PATHS),
            emulator_paths: reroot(&EMULATOR_PATHS),
        }
    }

    /// First root indicator that trips, if any.
    #[must_use]
    pub fn root_indicator(&self) -> Option<String> {
        for path in &self.su_exec_paths {
            if is_executable(path) {
                return Some(display_of(path));
            }
        }
        for path in &self.su_probe_paths {
            if path.exists() {
                return Some(display_of(path));
            }
        }
        for path in &self.root_app_paths {
            if path.exists() {
                return Some(display_of(path));
            }
        }
        None
    }

    /// Whether any emulator giveaway file exists.
    #[must_use]
    pub fn emulator_detected(&self) -> bool {
        self.emulator_paths.iter().any(|p| p.exists())
    }

    /// Run every probe and fold in the caller's mock-location state.
    #[must_use]
    pub fn report(&self, mock_location_active: bool) -> SecurityReport {
        let root_method = self.root_indicator();
        let emulator = self.emulator_detected();

        debug!(
            rooted = root_method.is_some(),
            emulator, mock_location_active, "Security: scan complete"
        );

        SecurityReport {
            rooted: root_method.is_some(),
            root_method,
            emulator,
            mock_location_active,
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

/// Whether `path` exists with any execute bit set. On platforms without
/// unix permissions, existence is the whole check.
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(path) {
            Ok(meta) => meta.permissions().mode() & 0o111 != 0,
            Err(_) => false,
        }
    }
    #[cfg(not(unix))]
    {
        path.exists()
    }
}

fn display_of(path: &Path) -> String {
    path.display().to_string()
}
