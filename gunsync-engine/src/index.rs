//! Search index collaborator.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use gunsync_types::Did;
use serde_json::Value;

/// Write interface to the search index.
///
/// `upsert` is keyed by DID and idempotent: re-indexing the same soul
/// yields the same or a newer document, never a duplicate. This is what
/// makes cache clears and migration re-runs safe.
#[async_trait]
pub trait RecordIndex: Send + Sync {
    /// Creates or replaces the document for a DID. Failures surface as
    /// [`SyncError::Index`].
    async fn upsert(&self, did: &Did, document: &Value) -> SyncResult<()>;
}

/// A recording in-memory index for testing.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    /// Mock index that records upserts and can be scripted to fail a
    /// given DID a set number of times (to exercise retry behavior).
    #[derive(Default)]
    pub struct MockIndex {
        documents: Mutex<HashMap<String, Value>>,
        failures: Mutex<HashMap<String, u32>>,
        upsert_calls: AtomicU64,
    }

    impl MockIndex {
        /// Creates an empty mock index.
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes the next `times` upserts for `did` fail.
        pub fn fail_did(&self, did: &Did, times: u32) {
            self.failures
                .lock()
                .unwrap()
                .insert(did.as_str().to_string(), times);
        }

        /// Returns the indexed document for a DID, if any.
        pub fn document(&self, did: &Did) -> Option<Value> {
            self.documents.lock().unwrap().get(did.as_str()).cloned()
        }

        /// Number of documents currently indexed.
        pub fn len(&self) -> usize {
            self.documents.lock().unwrap().len()
        }

        /// Whether the index holds no documents.
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        /// Total upsert attempts, including failed ones.
        pub fn upsert_calls(&self) -> u64 {
            self.upsert_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RecordIndex for MockIndex {
        async fn upsert(&self, did: &Did, document: &Value) -> SyncResult<()> {
            self.upsert_calls.fetch_add(1, Ordering::SeqCst);

            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(did.as_str()) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(SyncError::Index(format!("scripted failure for {did}")));
                }
            }
            drop(failures);

            self.documents
                .lock()
                .unwrap()
                .insert(did.as_str().to_string(), document.clone());
            Ok(())
        }
    }
}
