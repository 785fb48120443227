//! Core type definitions for gunsync.
//!
//! This crate defines the fundamental types shared by the sync engine
//! and its collaborators:
//! - Node and record identifiers (`NodeId`, `Did`)
//! - The discovered-record shape handed from the graph store to the engine
//! - Structural validation for raw record JSON
//!
//! Records are schemaless JSON at the graph-store boundary, so validation
//! here operates on `serde_json::Value` rather than deserializing into a
//! fixed struct. Everything downstream of these validators may assume the
//! validated shape.

mod ids;
mod record;

pub use ids::{Did, NodeId, DID_GUN_PREFIX, NODE_ID_LEN};
pub use record::{
    is_encrypted_record, is_valid_oip_record, DiscoveredRecord, PROTOCOL_VERSION,
    RECOGNIZED_SECTIONS,
};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    #[error("invalid node id: {0}")]
    InvalidNodeId(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
