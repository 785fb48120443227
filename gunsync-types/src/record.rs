//! Record shapes and structural validation.
//!
//! Two wire shapes exist, discriminated by `meta.encrypted`:
//! - a public record: `oip` metadata block plus an open `data` map of
//!   section payloads (`basic`, `post`, `image`, ...)
//! - an encrypted envelope: `meta.encrypted == true` and `data` reduced
//!   to the three opaque fields `{encrypted, iv, tag}`
//!
//! Validation happens at the boundary, before anything downstream
//! assumes a shape. Both validators are pure, total, and never panic.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// The one supported `oip.ver` protocol version.
pub const PROTOCOL_VERSION: &str = "0.8.0";

/// Section names a decrypted payload must carry at least one of to be
/// considered a usable record.
pub const RECOGNIZED_SECTIONS: &[&str] = &[
    "basic",
    "post",
    "image",
    "text",
    "video",
    "audio",
    "creatorRegistration",
];

/// A record surfaced by one discovery pass over the graph store.
///
/// Transient: produced per sync cycle and dropped once the record is
/// indexed or rejected. The search index is the system of record
/// post-sync.
#[derive(Debug, Clone)]
pub struct DiscoveredRecord {
    /// The graph store's content-addressable identifier.
    pub soul: String,
    /// Raw record JSON as stored.
    pub payload: Value,
    /// Node that published the record, if the store reports one.
    pub source_node: Option<String>,
    /// Whether the payload looked encrypted at discovery time.
    pub was_encrypted: bool,
    /// When this record was discovered.
    pub discovered_at: DateTime<Utc>,
}

impl DiscoveredRecord {
    /// Wraps a raw payload, sniffing the encrypted discriminant.
    #[must_use]
    pub fn new(soul: impl Into<String>, payload: Value, source_node: Option<String>) -> Self {
        let was_encrypted = is_encrypted_record(&payload);
        Self {
            soul: soul.into(),
            payload,
            source_node,
            was_encrypted,
            discovered_at: Utc::now(),
        }
    }
}

fn non_empty_str(value: Option<&Value>) -> bool {
    matches!(value.and_then(Value::as_str), Some(s) if !s.is_empty())
}

/// Returns true iff `record` is a structurally valid public OIP record:
/// `oip.ver` equals [`PROTOCOL_VERSION`], `oip.recordType` is a
/// non-empty string, and `oip.creator.publicKey` / `oip.creator.didAddress`
/// are both present non-empty strings.
#[must_use]
pub fn is_valid_oip_record(record: &Value) -> bool {
    let Some(oip) = record.get("oip") else {
        return false;
    };
    if oip.get("ver").and_then(Value::as_str) != Some(PROTOCOL_VERSION) {
        return false;
    }
    if !non_empty_str(oip.get("recordType")) {
        return false;
    }
    let Some(creator) = oip.get("creator") else {
        return false;
    };
    non_empty_str(creator.get("publicKey")) && non_empty_str(creator.get("didAddress"))
}

/// Returns true iff `record` is an encrypted envelope:
/// `meta.encrypted == true` and `data` carries the three opaque string
/// fields `encrypted`, `iv`, and `tag`. Absent `meta.encrypted` means
/// public, whatever the data shape.
#[must_use]
pub fn is_encrypted_record(record: &Value) -> bool {
    if record
        .pointer("/meta/encrypted")
        .and_then(Value::as_bool)
        != Some(true)
    {
        return false;
    }
    let Some(data) = record.get("data") else {
        return false;
    };
    ["encrypted", "iv", "tag"]
        .iter()
        .all(|field| matches!(data.get(field), Some(Value::String(_))))
}
