//! Shared sync state.
//!
//! One instance per engine, behind `Arc<RwLock<_>>`. The engine's cycle
//! workers are the only writers; status and health queries read through
//! snapshots.

use crate::health::HealthMetrics;
use std::collections::HashSet;

/// Process-wide sync state owned by one running engine.
#[derive(Debug, Default)]
pub struct SyncState {
    /// Souls already handled this process lifetime. Membership here is
    /// the at-most-once guarantee: a soul is only inserted after a
    /// successful index upsert or a permanent validation rejection.
    /// Transient failures (index faults, unresolvable keys) stay out so
    /// re-discovery can retry them.
    pub processed_souls: HashSet<String>,
    /// Discovery cursor; `None` until the first successful cycle
    /// against a store that supports incremental discovery.
    pub watermark: Option<String>,
    /// Accumulated health counters.
    pub metrics: HealthMetrics,
}

impl SyncState {
    /// Creates empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a soul has already been processed.
    #[must_use]
    pub fn is_processed(&self, soul: &str) -> bool {
        self.processed_souls.contains(soul)
    }

    /// Marks a soul processed. Returns false if it already was.
    pub fn mark_processed(&mut self, soul: impl Into<String>) -> bool {
        self.processed_souls.insert(soul.into())
    }

    /// Empties the processed-souls set, returning how many were
    /// dropped. Safe at any time: indexing is an upsert, so
    /// reprocessing trades redundant work, never correctness.
    pub fn clear_processed(&mut self) -> usize {
        let count = self.processed_souls.len();
        self.processed_souls.clear();
        count
    }
}
