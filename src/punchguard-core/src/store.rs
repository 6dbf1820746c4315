//! Durable persistence for the reliability state.
//!
//! The engine keeps one versioned record. Anything that prevents loading it
//! (missing file, unreadable JSON, schema mismatch) degrades to `None`,
//! which the engine reads as a data clear; a failed save is logged and the
//! in-memory record stays authoritative for the rest of the process.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GuardError;

/// Schema version for persisted records.
const RECORD_VERSION: u32 = 1;

/// File name for the persisted record inside the storage directory.
pub const STATE_FILE_NAME: &str = "time_reliability.json";

/// The single persisted record owned by the reliability engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReliabilityRecord {
    /// Schema version of this record.
    pub version: u32,

    /// Reliability score, [0,100].
    pub reliability_value: i32,

    /// Reboot penalty charged for the current event (idempotence latch).
    pub reboot_penalty_applied: bool,

    /// Clear penalty charged for the current event (idempotence latch).
    pub clear_penalty_applied: bool,

    /// Reboot detected and not yet corrected.
    pub is_rebooted: bool,

    /// Data clear detected and not yet corrected.
    pub is_cleared: bool,

    /// Boot id at the last baseline sync ("" = never seen).
    pub last_boot_id: String,

    /// Boot count at the last baseline sync (0 = never seen).
    pub last_boot_count: i32,

    /// Last network-corroborated time, epoch milliseconds (0 = never).
    pub last_legal_time: i64,

    /// Last stored network time, epoch milliseconds (0 = never).
    pub network_real_time: i64,
}

impl Default for ReliabilityRecord {
    fn default() -> Self {
        Self {
            version: RECORD_VERSION,
            reliability_value: 100,
            reboot_penalty_applied: false,
            clear_penalty_applied: false,
            is_rebooted: false,
            is_cleared: false,
            last_boot_id: String::new(),
            last_boot_count: 0,
            last_legal_time: 0,
            network_real_time: 0,
        }
    }
}

/// Storage collaborator for the reliability record.
pub trait StateStore: Send + Sync {
    /// Load the persisted record.
    ///
    /// `None` means no usable prior record exists; a first run and a wiped
    /// store are indistinguishable here, which is exactly the clear-detection
    /// contract.
    fn load(&self) -> Option<ReliabilityRecord>;

    /// Persist the record.
    ///
    /// # Errors
    ///
    /// Returns the underlying failure so the caller can log it; the caller
    /// keeps its in-memory record authoritative either way.
    fn save(&self, record: &ReliabilityRecord) -> Result<(), GuardError>;
}

/// JSON-file store for hosts with a writable data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first
    /// save, not here.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the record file.
    #[must_use]
    pub fn record_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE_NAME)
    }

    fn parse(path: &Path, raw: &str) -> Option<ReliabilityRecord> {
        let record: ReliabilityRecord = match serde_json::from_str(raw) {
            Ok(r) => r,
            Err(e) => {
                warn!("Store: unparsable record at {}: {}", path.display(), e);
                return None;
            },
        };

        if record.version != RECORD_VERSION {
            warn!(
                version = record.version,
                expected = RECORD_VERSION,
                "Store: record schema mismatch, treating as absent"
            );
            return None;
        }

        Some(record)
    }
}

impl StateStore for FileStore {
    fn load(&self) -> Option<ReliabilityRecord> {
        let path = self.record_path();
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Store: no record at {} ({})", path.display(), e);
                return None;
            },
        };

        let record = Self::parse(&path, &raw)?;
        debug!(
            score = record.reliability_value,
            "Store: loaded reliability record"
        );
        Some(record)
    }

    fn save(&self, record: &ReliabilityRecord) -> Result<(), GuardError> {
        std::fs::create_dir_all(&self.dir)?;

        let data = serde_json::to_vec_pretty(record)?;

        // Write-then-rename so a crash mid-write never leaves a torn record.
        let path = self.record_path();
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &data)?;
        std::fs::rename(&tmp, &path)?;

        debug!(
            score = record.reliability_value,
            path = %path.display(),
            "Store: persisted reliability record"
        );
        Ok(())
    }
}

/// In-memory store for tests and hosts without a writable directory.
#[derive(Default)]
pub struct MemoryStore {
    record: RwLock<Option<ReliabilityRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Option<ReliabilityRecord> {
        self.record.read().clone()
    }

    fn save(&self, record: &ReliabilityRecord) -> Result<(), GuardError> {
        *self.record.write() = Some(record.clone());
        Ok(())
    }
}
