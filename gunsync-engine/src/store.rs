//! Graph store collaborator.
//!
//! The engine only reads: it lists souls with payloads and an encrypted
//! indicator. The store's own replication and conflict protocol is not
//! implemented here.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use gunsync_types::DiscoveredRecord;
use std::collections::HashMap;

/// One discovery pass over the graph store.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Records changed or created since the requested watermark.
    pub records: Vec<DiscoveredRecord>,
    /// Cursor to resume from next cycle. `None` means the store does
    /// not support incremental discovery and every pass is a full scan.
    pub watermark: Option<String>,
}

/// Read interface to the distributed graph store.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Lists souls changed or created since the watermark (all souls
    /// when `None`). Unreachable stores fail with
    /// [`SyncError::StoreUnavailable`].
    async fn discover_since(&self, watermark: Option<&str>) -> SyncResult<Discovery>;

    /// Lists the full existing corpus. Used by the one-time migration
    /// backfill, not by the periodic cycle.
    async fn list_all(&self) -> SyncResult<Vec<DiscoveredRecord>>;

    /// Counts known souls grouped by record type, for registry stats.
    async fn count_by_record_type(&self) -> SyncResult<HashMap<String, u64>>;
}

/// A scriptable in-memory graph store for testing.
pub mod mock {
    use super::*;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Mutex;

    /// Mock store holding a fixed record set. Discovery returns the
    /// whole set on every pass (the engine's dedup is what keeps work
    /// at-most-once), advancing a numeric watermark.
    #[derive(Default)]
    pub struct MockGraphStore {
        records: Mutex<Vec<DiscoveredRecord>>,
        unavailable: AtomicBool,
        discover_calls: AtomicU64,
        discover_delay: Mutex<Option<std::time::Duration>>,
    }

    impl MockGraphStore {
        /// Creates an empty mock store.
        pub fn new() -> Self {
            Self::default()
        }

        /// Adds a record under the given soul.
        pub fn put(&self, soul: impl Into<String>, payload: Value) {
            let record = DiscoveredRecord::new(soul, payload, Some("mock".to_string()));
            self.records.lock().unwrap().push(record);
        }

        /// Makes every call fail with `StoreUnavailable` until reset.
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        /// Number of discovery passes served.
        pub fn discover_calls(&self) -> u64 {
            self.discover_calls.load(Ordering::SeqCst)
        }

        /// Makes discovery sleep before answering, to simulate a slow
        /// peer.
        pub fn set_discover_delay(&self, delay: Option<std::time::Duration>) {
            *self.discover_delay.lock().unwrap() = delay;
        }

        fn check_available(&self) -> SyncResult<()> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(SyncError::StoreUnavailable("mock store offline".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl GraphStore for MockGraphStore {
        async fn discover_since(&self, _watermark: Option<&str>) -> SyncResult<Discovery> {
            let delay = *self.discover_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.check_available()?;
            let calls = self.discover_calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Discovery {
                records: self.records.lock().unwrap().clone(),
                watermark: Some(calls.to_string()),
            })
        }

        async fn list_all(&self) -> SyncResult<Vec<DiscoveredRecord>> {
            self.check_available()?;
            Ok(self.records.lock().unwrap().clone())
        }

        async fn count_by_record_type(&self) -> SyncResult<HashMap<String, u64>> {
            self.check_available()?;
            let mut counts: HashMap<String, u64> = HashMap::new();
            for record in self.records.lock().unwrap().iter() {
                let record_type = if record.was_encrypted {
                    "encrypted"
                } else {
                    record
                        .payload
                        .pointer("/oip/recordType")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown")
                };
                *counts.entry(record_type.to_string()).or_default() += 1;
            }
            Ok(counts)
        }
    }
}
