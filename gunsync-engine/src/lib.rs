//! Record synchronization engine for gunsync.
//!
//! Reconciles content records stored in a peer-to-peer graph store with
//! a centralized search index, so records written by any participating
//! node become discoverable everywhere — including end-to-end encrypted
//! records, which are decrypted and re-validated before indexing.
//!
//! # Architecture
//!
//! - **Collaborators**: the graph store and search index are reached
//!   through the [`GraphStore`] and [`RecordIndex`] traits; encryption
//!   keys come from `gunsync_crypto::KeyResolver`. The engine does not
//!   implement their protocols.
//! - **Cycle**: a timer drives sequential discovery→validate→decrypt→
//!   normalize→index passes. Cycles never overlap; per-record work runs
//!   with bounded concurrency and per-record failure isolation.
//! - **State**: one [`SyncEngine`] instance owns its node identity and
//!   [`SyncState`] (processed souls, watermark, health counters);
//!   status and health queries are read-only snapshots.
//! - **Migration**: a one-time backfill over the full corpus reuses the
//!   per-cycle record path and seeds the dedup state.
//!
//! # Example
//!
//! ```no_run
//! use gunsync_crypto::StaticKeyResolver;
//! use gunsync_engine::{index::mock::MockIndex, store::mock::MockGraphStore};
//! use gunsync_engine::{SyncConfig, SyncEngine};
//! use std::sync::Arc;
//!
//! # async fn run() -> gunsync_engine::SyncResult<()> {
//! let engine = SyncEngine::new(
//!     Arc::new(MockGraphStore::new()),
//!     Arc::new(MockIndex::new()),
//!     Arc::new(StaticKeyResolver::new()),
//!     SyncConfig::default(),
//! );
//! engine.migrate_existing().await?;
//! engine.start().await?;
//! # Ok(())
//! # }
//! ```

mod convert;
mod engine;
mod error;
mod health;
mod migrate;
mod registry;
mod state;

pub mod index;
pub mod store;

pub use convert::convert_gun_record_for_index;
pub use engine::{SyncConfig, SyncEngine, SyncStatus};
pub use error::{SyncError, SyncResult};
pub use health::{HealthMetrics, HealthMonitor, HealthStatus};
pub use migrate::MigrationReport;
pub use registry::{Registry, RegistryStats};
pub use state::SyncState;

pub use index::RecordIndex;
pub use store::{Discovery, GraphStore};
