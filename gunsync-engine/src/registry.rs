//! Node registry: process identity plus aggregate record statistics.

use crate::error::SyncResult;
use crate::store::GraphStore;
use gunsync_types::NodeId;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Aggregate view of the records the graph store knows about.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    /// Identity of the reporting node.
    pub node_id: NodeId,
    /// Total souls known to the store.
    pub total_souls: u64,
    /// Soul counts grouped by record type.
    pub by_record_type: HashMap<String, u64>,
}

/// Registry over the graph store for one node.
pub struct Registry {
    node_id: NodeId,
    graph: Arc<dyn GraphStore>,
}

impl Registry {
    /// Creates a registry reporting as `node_id`.
    pub fn new(node_id: NodeId, graph: Arc<dyn GraphStore>) -> Self {
        Self { node_id, graph }
    }

    /// This node's identity.
    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Queries the store for per-record-type soul counts.
    ///
    /// Fails with `StoreUnavailable` when the store cannot be reached;
    /// callers typically degrade by omitting stats from their response
    /// rather than failing outright.
    pub async fn stats(&self) -> SyncResult<RegistryStats> {
        let by_record_type = self.graph.count_by_record_type().await?;
        let total_souls = by_record_type.values().sum();
        debug!(total_souls, "registry stats collected");
        Ok(RegistryStats {
            node_id: self.node_id.clone(),
            total_souls,
            by_record_type,
        })
    }
}
