//! # punchguard-core
//!
//! Core trust logic for PunchGuard - the device-side anti-cheat module
//! that scores location fixes and clock reliability for time-punch hosts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    AntiCheatMonitor                          │
//! │                                                              │
//! │  ┌────────────────────┐      ┌────────────────────────┐    │
//! │  │ LocationTrust-     │      │ TimeReliability-       │    │
//! │  │ Evaluator          │      │ Engine                 │    │
//! │  │ (score + verdict)  │      │ (persisted record)     │    │
//! │  └─────────┬──────────┘      └───────────┬────────────┘    │
//! │            │                             │                  │
//! │            ▼                             ▼                  │
//! │  ┌────────────────────┐      ┌────────────────────────┐    │
//! │  │ MockFlag           │      │ StateStore             │    │
//! │  │ (shared atomic)    │      │ (file / memory)        │    │
//! │  └────────────────────┘      └────────────────────────┘    │
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │              DeviceSignals                        │      │
//! │  │   (boot identity, clocks, settings, timezone)    │      │
//! │  └──────────────────────────────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Trust Properties
//!
//! - **Monotonic scoring**: Every penalty only lowers a score, [0,100]
//! - **Event latches**: Reboot and clear each charged once per event
//! - **Best-effort persistence**: Save failures never break scoring
//! - **Pure reads**: Cheating checks and telemetry never mutate state

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::pedantic)] // Too strict for production code
#![allow(clippy::doc_markdown)] // Allow product names without backticks
#![allow(clippy::missing_errors_doc)] // Error documentation not required
#![allow(clippy::missing_panics_doc)] // Panic documentation not required
#![allow(clippy::module_name_repetitions)] // Allow Type in module::Type
#![allow(clippy::must_use_candidate)] // Not all functions need must_use

pub mod config;
pub mod error;
pub mod location;
pub mod monitor;
pub mod security;
pub mod signals;
pub mod store;
pub mod time_trust;
pub mod types;

pub use config::GuardConfig;
pub use error::GuardError;
pub use location::{LocationTrustEvaluator, MockFlag};
pub use monitor::{mock_location_from_coords, AntiCheatMonitor};
pub use security::SecurityScanner;
pub use signals::{DeviceSignals, FixedSignals, HostSignals, SystemSignals};
pub use store::{FileStore, MemoryStore, ReliabilityRecord, StateStore, STATE_FILE_NAME};
pub use time_trust::TimeReliabilityEngine;
pub use types::{
    CheatingVerdict, LocationProvider, LocationSample, LocationSource, LocationStatus,
    LocationVerdict, RefreshKind, SecurityReport, TelemetrySnapshot, TimeCorrectionVerdict,
    TimeInitVerdict, TimezoneReport,
};
