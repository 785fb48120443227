//! The sync engine: timer-driven discovery→validate→decrypt→normalize→index
//! cycles over the graph store.
//!
//! Cycles never overlap. One logical timer drives sequential cycles and a
//! single-flight lock is checked-and-set before any cycle starts, whether
//! it comes from the timer or from `force_sync`. Within a cycle,
//! per-record work runs with bounded concurrency over the shared state.

use crate::convert::convert_gun_record_for_index;
use crate::error::{SyncError, SyncResult};
use crate::health::{HealthMetrics, HealthMonitor};
use crate::index::RecordIndex;
use crate::migrate::MigrationReport;
use crate::registry::Registry;
use crate::state::SyncState;
use crate::store::GraphStore;
use futures::stream::{self, StreamExt};
use gunsync_crypto::{validate_decrypted_record, KeyResolver, PrivateRecordHandler};
use gunsync_types::{is_encrypted_record, is_valid_oip_record, Did, DiscoveredRecord, NodeId};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Period between sync cycles.
    pub sync_interval: Duration,
    /// Bounded worker count for per-record work within a cycle.
    pub max_concurrent_records: usize,
    /// Timeout applied to each collaborator call, so one unresponsive
    /// peer cannot stall a cycle indefinitely.
    pub request_timeout: Duration,
    /// Errors-to-discovered ratio above which the engine reports
    /// unhealthy.
    pub error_rate_threshold: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sync_interval: Duration::from_secs(30),
            max_concurrent_records: 8,
            request_timeout: Duration::from_secs(10),
            error_rate_threshold: 0.1,
        }
    }
}

/// Commands from the engine handle to the timer task.
enum EngineCommand {
    /// Restart the interval so the next tick is one full period away.
    ResetTimer,
    /// Exit the loop after any in-flight cycle completes.
    Shutdown,
}

/// Read-only snapshot of the engine for status queries.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    /// Whether the timer loop is armed.
    pub running: bool,
    /// This process's node identity.
    pub node_id: NodeId,
    /// Souls handled this process lifetime.
    pub processed_souls: usize,
    /// Current discovery cursor.
    pub watermark: Option<String>,
    /// Counter snapshot.
    pub metrics: HealthMetrics,
}

/// Everything a cycle needs, shared between the engine handle, the
/// timer task, and per-record workers.
struct EngineCore {
    config: SyncConfig,
    graph: Arc<dyn GraphStore>,
    index: Arc<dyn RecordIndex>,
    private: PrivateRecordHandler,
    state: Arc<RwLock<SyncState>>,
    /// Single-flight guard: held for the duration of any cycle.
    cycle_lock: Mutex<()>,
}

/// The record synchronization engine.
///
/// Owns its `SyncState` and node identity exclusively; collaborators
/// are injected so instances can be tested in isolation.
pub struct SyncEngine {
    node_id: NodeId,
    core: Arc<EngineCore>,
    running: Arc<AtomicBool>,
    command_tx: Mutex<Option<mpsc::Sender<EngineCommand>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncEngine {
    /// Creates a stopped engine with a freshly generated node identity.
    pub fn new(
        graph: Arc<dyn GraphStore>,
        index: Arc<dyn RecordIndex>,
        keys: Arc<dyn KeyResolver>,
        config: SyncConfig,
    ) -> Self {
        Self {
            node_id: NodeId::generate(),
            core: Arc::new(EngineCore {
                config,
                graph,
                index,
                private: PrivateRecordHandler::new(keys),
                state: Arc::new(RwLock::new(SyncState::new())),
                cycle_lock: Mutex::new(()),
            }),
            running: Arc::new(AtomicBool::new(false)),
            command_tx: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    /// This process's node identity.
    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.core.config
    }

    /// Whether the timer loop is armed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Arms the periodic timer. The first cycle runs immediately, then
    /// every `sync_interval`.
    pub async fn start(&self) -> SyncResult<()> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SyncError::AlreadyRunning);
        }

        let (tx, rx) = mpsc::channel(8);
        *self.command_tx.lock().await = Some(tx);
        let handle = tokio::spawn(run_loop(self.core.clone(), rx, self.running.clone()));
        *self.task.lock().await = Some(handle);

        info!(
            node_id = %self.node_id,
            interval_ms = self.core.config.sync_interval.as_millis() as u64,
            "sync engine started"
        );
        Ok(())
    }

    /// Disarms the timer and waits for any in-flight cycle to finish.
    /// Idempotent; never interrupts mid-record.
    pub async fn stop(&self) {
        if let Some(tx) = self.command_tx.lock().await.take() {
            let _ = tx.send(EngineCommand::Shutdown).await;
        }
        if let Some(handle) = self.task.lock().await.take() {
            let _ = handle.await;
        }
        // A forced cycle may be running on a caller's task rather than
        // the timer task; wait for it too.
        drop(self.core.cycle_lock.lock().await);
        self.running.store(false, Ordering::SeqCst);
        info!("sync engine stopped");
    }

    /// Runs one cycle out-of-band and resets the timer.
    ///
    /// Only callable while running. Fails with `AlreadyInProgress` if a
    /// cycle is currently executing; cycles never overlap.
    pub async fn force_sync(&self) -> SyncResult<()> {
        if !self.is_running() {
            return Err(SyncError::NotRunning);
        }

        let result = {
            let Ok(_guard) = self.core.cycle_lock.try_lock() else {
                return Err(SyncError::AlreadyInProgress);
            };
            self.core.run_cycle().await
        };

        if let Some(tx) = self.command_tx.lock().await.as_ref() {
            let _ = tx.send(EngineCommand::ResetTimer).await;
        }
        result
    }

    /// Empties the processed-souls cache, returning how many entries
    /// were dropped. Safe at any time: indexing is an upsert, so a
    /// reprocessed soul yields the same or a newer document.
    pub async fn clear_processed_cache(&self) -> usize {
        let cleared = self.core.state.write().await.clear_processed();
        info!(cleared, "processed-souls cache cleared");
        cleared
    }

    /// Read-only engine snapshot.
    pub async fn status(&self) -> SyncStatus {
        let state = self.core.state.read().await;
        SyncStatus {
            running: self.is_running(),
            node_id: self.node_id.clone(),
            processed_souls: state.processed_souls.len(),
            watermark: state.watermark.clone(),
            metrics: state.metrics.clone(),
        }
    }

    /// Read-only health view sharing this engine's state.
    #[must_use]
    pub fn health_monitor(&self) -> HealthMonitor {
        HealthMonitor::new(
            self.core.state.clone(),
            self.core.config.sync_interval,
            self.core.config.error_rate_threshold,
        )
    }

    /// Registry over this engine's graph store, reporting as this node.
    #[must_use]
    pub fn registry(&self) -> Registry {
        Registry::new(self.node_id.clone(), self.core.graph.clone())
    }

    /// One-time bulk backfill of the full existing corpus, run before
    /// the first `start()`.
    ///
    /// Reuses the per-record cycle path, so behavior matches continuous
    /// sync exactly, and seeds the processed-souls set so the live
    /// engine does not immediately reprocess migrated records. Safely
    /// re-runnable: re-migrating an already-indexed soul upserts the
    /// same content.
    pub async fn migrate_existing(&self) -> SyncResult<MigrationReport> {
        if self.is_running() {
            return Err(SyncError::AlreadyRunning);
        }
        let Ok(_guard) = self.core.cycle_lock.try_lock() else {
            return Err(SyncError::AlreadyInProgress);
        };

        let records = self.core.graph.list_all().await?;
        info!(total = records.len(), "migration started");

        let migrated = AtomicU64::new(0);
        let skipped = AtomicU64::new(0);
        let failed = AtomicU64::new(0);
        let core = &self.core;

        stream::iter(records)
            .for_each_concurrent(core.config.max_concurrent_records, |record| {
                let (migrated, skipped, failed) = (&migrated, &skipped, &failed);
                async move {
                    if core.state.read().await.is_processed(&record.soul) {
                        skipped.fetch_add(1, Ordering::SeqCst);
                        return;
                    }
                    match core.process_record(&record).await {
                        Ok(()) => migrated.fetch_add(1, Ordering::SeqCst),
                        Err(_) => failed.fetch_add(1, Ordering::SeqCst),
                    };
                }
            })
            .await;

        let report = MigrationReport {
            migrated: migrated.into_inner(),
            skipped: skipped.into_inner(),
            failed: failed.into_inner(),
        };
        info!(
            migrated = report.migrated,
            skipped = report.skipped,
            failed = report.failed,
            "migration complete"
        );
        Ok(report)
    }
}

impl EngineCore {
    /// Runs one cycle if none is in flight.
    async fn try_run_cycle(&self) -> SyncResult<()> {
        let Ok(_guard) = self.cycle_lock.try_lock() else {
            return Err(SyncError::AlreadyInProgress);
        };
        self.run_cycle().await
    }

    /// One discovery→process→finalize pass. Caller holds the
    /// single-flight lock.
    async fn run_cycle(&self) -> SyncResult<()> {
        let started = Instant::now();

        let watermark = self.state.read().await.watermark.clone();
        let discovery = match tokio::time::timeout(
            self.config.request_timeout,
            self.graph.discover_since(watermark.as_deref()),
        )
        .await
        {
            Ok(Ok(discovery)) => discovery,
            Ok(Err(e)) => return self.abort_cycle(e).await,
            Err(_) => {
                return self
                    .abort_cycle(SyncError::StoreUnavailable("discovery timed out".to_string()))
                    .await;
            }
        };

        let pending: Vec<DiscoveredRecord> = {
            let state = self.state.read().await;
            discovery
                .records
                .into_iter()
                .filter(|r| !state.is_processed(&r.soul))
                .collect()
        };
        debug!(pending = pending.len(), "discovery complete");

        stream::iter(pending)
            .for_each_concurrent(self.config.max_concurrent_records, |record| async move {
                // Per-record failure isolation: process_record counts
                // and logs; one bad record never aborts the cycle.
                let _ = self.process_record(&record).await;
            })
            .await;

        let mut state = self.state.write().await;
        if discovery.watermark.is_some() {
            state.watermark = discovery.watermark;
        }
        state.metrics.record_cycle(started.elapsed());
        info!(
            cycle = state.metrics.sync_cycles,
            total_synced = state.metrics.total_synced,
            total_errors = state.metrics.total_errors,
            "sync cycle complete"
        );
        Ok(())
    }

    /// Discovery failed: count the aborted cycle without touching the
    /// watermark, processed souls, or `last_sync_time`.
    async fn abort_cycle(&self, error: SyncError) -> SyncResult<()> {
        warn!(error = %error, "discovery failed, aborting cycle");
        self.state.write().await.metrics.record_failed_cycle();
        Err(error)
    }

    /// Processes one discovered record end to end, updating counters
    /// and the dedup set. Shared verbatim between the periodic cycle
    /// and migration.
    async fn process_record(&self, record: &DiscoveredRecord) -> SyncResult<()> {
        self.state.write().await.metrics.total_discovered += 1;

        match self.sync_record(record).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                state.mark_processed(record.soul.clone());
                state.metrics.total_synced += 1;
                debug!(soul = %record.soul, "record indexed");
                Ok(())
            }
            Err(e) => {
                let mut state = self.state.write().await;
                state.metrics.total_errors += 1;
                // Only structural invalidity is settled for the process
                // lifetime. Index faults and decryption/key failures
                // leave the soul unprocessed so re-discovery (or a key
                // that resolves later) can retry it.
                if matches!(e, SyncError::Validation(_)) {
                    state.mark_processed(record.soul.clone());
                }
                drop(state);
                warn!(soul = %record.soul, error = %e, "record skipped");
                Err(e)
            }
        }
    }

    /// Validate/decrypt, normalize, and upsert one record. Treated as
    /// atomic: no partial writes, and cancellation takes effect only
    /// between records.
    async fn sync_record(&self, record: &DiscoveredRecord) -> SyncResult<()> {
        let payload = if is_encrypted_record(&record.payload) {
            let plain = self.private.decrypt_record(&record.payload).await?;
            if !validate_decrypted_record(&plain) {
                return Err(SyncError::Validation(
                    "decrypted payload has no recognized data section".to_string(),
                ));
            }
            plain
        } else {
            if !is_valid_oip_record(&record.payload) {
                return Err(SyncError::Validation(
                    "missing or malformed oip metadata".to_string(),
                ));
            }
            record.payload.clone()
        };

        let did = Did::from_soul(&record.soul);
        let document = convert_gun_record_for_index(&payload, &did);
        match tokio::time::timeout(self.config.request_timeout, self.index.upsert(&did, &document))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(SyncError::Index(format!("upsert timed out for {did}"))),
        }
    }
}

/// The timer loop. Exits on shutdown; an in-flight cycle always
/// completes before the loop observes the command.
async fn run_loop(
    core: Arc<EngineCore>,
    mut commands: mpsc::Receiver<EngineCommand>,
    running: Arc<AtomicBool>,
) {
    let mut interval = tokio::time::interval(core.config.sync_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            cmd = commands.recv() => match cmd {
                Some(EngineCommand::ResetTimer) => interval.reset(),
                Some(EngineCommand::Shutdown) | None => break,
            },
            _ = interval.tick() => {
                match core.try_run_cycle().await {
                    Ok(()) => {}
                    Err(SyncError::AlreadyInProgress) => {
                        debug!("cycle already in progress, skipping tick");
                    }
                    // Logged and counted inside the cycle; the loop
                    // never crashes, it retries at the next tick.
                    Err(_) => {}
                }
            }
        }
    }

    running.store(false, Ordering::SeqCst);
    debug!("sync loop exited");
}
