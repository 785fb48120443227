//! One-time bulk backfill of pre-existing records.
//!
//! The migration itself lives on the engine
//! ([`SyncEngine::migrate_existing`](crate::SyncEngine::migrate_existing))
//! so it shares the per-record path and dedup state with continuous
//! sync. This module holds the report type.

use serde::Serialize;

/// Outcome of one migration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Records newly indexed by this pass.
    pub migrated: u64,
    /// Records skipped because their soul was already processed.
    pub skipped: u64,
    /// Records rejected (validation, decryption, or index failure).
    pub failed: u64,
}

impl MigrationReport {
    /// Total records examined.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.migrated + self.skipped + self.failed
    }
}
