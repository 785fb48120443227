//! Health accounting.
//!
//! The engine accumulates counters as it works; the [`HealthMonitor`]
//! is a read-only handle over the same shared state that derives a
//! health verdict on demand. Neither path ever mutates engine state.

use crate::state::SyncState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Monotonic counters and timing accumulated across sync cycles.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthMetrics {
    /// Records seen across all cycles, before validation.
    pub total_discovered: u64,
    /// Records successfully indexed.
    pub total_synced: u64,
    /// Record- and cycle-level failures.
    pub total_errors: u64,
    /// Completion time of the last successful cycle.
    pub last_sync_time: Option<DateTime<Utc>>,
    /// Running average duration of successful cycles, in milliseconds.
    pub average_sync_time_ms: f64,
    /// Cycles attempted, including aborted ones.
    pub sync_cycles: u64,
    /// Cycles that completed discovery (the denominator for the
    /// running average).
    pub cycles_measured: u64,
}

impl HealthMetrics {
    /// Folds a completed cycle's duration into the running average and
    /// stamps `last_sync_time`.
    pub fn record_cycle(&mut self, elapsed: Duration) {
        self.sync_cycles += 1;
        self.cycles_measured += 1;
        let ms = elapsed.as_secs_f64() * 1000.0;
        self.average_sync_time_ms += (ms - self.average_sync_time_ms) / self.cycles_measured as f64;
        self.last_sync_time = Some(Utc::now());
    }

    /// Records a cycle aborted at the discovery step. `last_sync_time`
    /// and the running average are left unchanged.
    pub fn record_failed_cycle(&mut self) {
        self.sync_cycles += 1;
        self.total_errors += 1;
    }

    /// Fraction of discovered records that were indexed. Zero when
    /// nothing has been discovered (never divides by zero).
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.total_discovered == 0 {
            0.0
        } else {
            self.total_synced as f64 / self.total_discovered as f64
        }
    }

    /// Fraction of discovered records that failed. Zero when nothing
    /// has been discovered.
    #[must_use]
    pub fn error_rate(&self) -> f64 {
        if self.total_discovered == 0 {
            0.0
        } else {
            self.total_errors as f64 / self.total_discovered as f64
        }
    }
}

/// Point-in-time health snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Error rate below threshold and a recent successful cycle.
    pub healthy: bool,
    /// `total_synced / total_discovered`, 0.0 when nothing discovered.
    pub success_rate: f64,
    /// Counter snapshot.
    pub metrics: HealthMetrics,
}

/// Read-only health view over the engine's shared state.
#[derive(Clone)]
pub struct HealthMonitor {
    state: Arc<RwLock<SyncState>>,
    sync_interval: Duration,
    error_rate_threshold: f64,
}

impl HealthMonitor {
    pub(crate) fn new(
        state: Arc<RwLock<SyncState>>,
        sync_interval: Duration,
        error_rate_threshold: f64,
    ) -> Self {
        Self {
            state,
            sync_interval,
            error_rate_threshold,
        }
    }

    /// Derives the current health verdict. Healthy means the error rate
    /// is below the configured threshold and the last successful cycle
    /// finished within twice the sync interval.
    pub async fn status(&self) -> HealthStatus {
        let state = self.state.read().await;
        let metrics = state.metrics.clone();
        drop(state);

        let fresh = metrics.last_sync_time.is_some_and(|t| {
            match Utc::now().signed_duration_since(t).to_std() {
                Ok(age) => age <= self.sync_interval * 2,
                // Clock skew put the stamp in the future; treat as fresh.
                Err(_) => true,
            }
        });
        let healthy = metrics.error_rate() < self.error_rate_threshold && fresh;

        HealthStatus {
            healthy,
            success_rate: metrics.success_rate(),
            metrics,
        }
    }
}
