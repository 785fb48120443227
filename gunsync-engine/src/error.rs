//! Error types for the sync engine.
//!
//! Propagation policy: record-level errors never escape a sync cycle
//! (they are counted and logged per record), and cycle-level errors
//! never escape the timer task. The engine surfaces health through the
//! metrics read path, not through thrown faults.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Structurally invalid record. Permanent — the soul is skipped,
    /// never retried.
    #[error("invalid record: {0}")]
    Validation(String),

    /// Decryption or key-resolution failure for a private record.
    #[error(transparent)]
    Crypto(#[from] gunsync_crypto::CryptoError),

    /// Search-index failure. Transient — the soul is not marked
    /// processed and is retried next cycle.
    #[error("index error: {0}")]
    Index(String),

    /// Graph store unreachable. Aborts the whole cycle; retried at the
    /// next timer tick.
    #[error("graph store unavailable: {0}")]
    StoreUnavailable(String),

    /// A sync cycle is currently executing. Returned synchronously from
    /// `force_sync`; not a fault.
    #[error("a sync cycle is already in progress")]
    AlreadyInProgress,

    /// The engine is already started.
    #[error("sync engine is already running")]
    AlreadyRunning,

    /// The engine is not running.
    #[error("sync engine is not running")]
    NotRunning,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
