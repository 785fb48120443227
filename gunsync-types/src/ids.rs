//! Identifier types used throughout the gunsync engine.
//!
//! Node identifiers are short, fixed-format strings rather than UUIDs:
//! the graph store addresses nodes by a 16-character base-36 id that is
//! regenerated on every process start.

use crate::Error;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of a node identifier in characters.
pub const NODE_ID_LEN: usize = 16;

/// Prefix for graph-store-originated DIDs.
pub const DID_GUN_PREFIX: &str = "did:gun:";

const NODE_ID_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Number of random characters in a node id; the remainder is a
/// time-derived fragment.
const NODE_ID_RANDOM_LEN: usize = 10;

/// Identity of a sync process within the cluster.
///
/// Generated once at startup and immutable for the process lifetime.
/// The format is stable (16 lowercase base-36 characters) but the value
/// folds in the current time, so every invocation yields a fresh id.
/// Callers must not assume global uniqueness, only a vanishing collision
/// probability within the cluster's operating lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Generates a new node id from process randomness plus a fragment
    /// derived from the current unix-millisecond clock.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut id = String::with_capacity(NODE_ID_LEN);
        for _ in 0..NODE_ID_RANDOM_LEN {
            let idx = rng.gen_range(0..NODE_ID_CHARSET.len());
            id.push(NODE_ID_CHARSET[idx] as char);
        }

        // Time fragment: low bits of the millisecond clock in base 36,
        // zero-padded to fill the remaining characters.
        let frag_len = NODE_ID_LEN - NODE_ID_RANDOM_LEN;
        let mut millis = chrono::Utc::now().timestamp_millis() as u64;
        let mut frag = [0u8; NODE_ID_LEN];
        for slot in frag.iter_mut().take(frag_len) {
            *slot = NODE_ID_CHARSET[(millis % 36) as usize];
            millis /= 36;
        }
        for slot in frag.iter().take(frag_len).rev() {
            id.push(*slot as char);
        }

        Self(id)
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses a node id, enforcing length and charset.
    pub fn parse(s: &str) -> Result<Self, Error> {
        if s.len() != NODE_ID_LEN || !s.bytes().all(|b| NODE_ID_CHARSET.contains(&b)) {
            return Err(Error::InvalidNodeId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Decentralized identifier for a graph-store record: `did:gun:<soul>`.
///
/// The soul is the store's content-addressable identifier; the DID is
/// preserved verbatim into indexed documents and used as the index key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Did(String);

impl Did {
    /// Builds the DID for a graph-store soul.
    #[must_use]
    pub fn from_soul(soul: &str) -> Self {
        Self(format!("{DID_GUN_PREFIX}{soul}"))
    }

    /// Returns the soul portion of the DID.
    #[must_use]
    pub fn soul(&self) -> &str {
        &self.0[DID_GUN_PREFIX.len()..]
    }

    /// Returns the full DID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses a DID string, enforcing the `did:gun:` method prefix and a
    /// non-empty soul.
    pub fn parse(s: &str) -> Result<Self, Error> {
        match s.strip_prefix(DID_GUN_PREFIX) {
            Some(soul) if !soul.is_empty() => Ok(Self(s.to_string())),
            _ => Err(Error::InvalidDid(s.to_string())),
        }
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Did {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
