//! Error types for storage and boundary operations.

use thiserror::Error;

/// Errors that can occur in the storage and transport layers.
///
/// Detections are not errors: a mock provider, a reboot, a data clear, or a
/// skewed clock is a scored outcome carried inside a verdict. `GuardError`
/// only covers the plumbing around the evaluators.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Durable state could not be read or written.
    #[error("Storage error: {message}")]
    Storage {
        /// Error message.
        message: String,
    },

    /// A record or verdict could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error from the storage layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid argument crossing the FFI or CLI boundary.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Reason the input was rejected.
        message: String,
    },
}

impl GuardError {
    /// Check if this error came from the best-effort storage path.
    ///
    /// Storage errors never abort an evaluation; the engine logs them and
    /// continues with its in-memory state.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Io(_))
    }
}
