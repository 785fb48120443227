//! Record encryption keys.
//!
//! Keys are supplied by an external key service through the
//! [`KeyResolver`](crate::KeyResolver) seam; this module only defines the
//! in-memory representation, with automatic zeroization on drop.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of record encryption keys in bytes (256 bits for AES-256-GCM).
pub const KEY_SIZE: usize = 32;

/// A record encryption key with automatic zeroization on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RecordKey {
    bytes: [u8; KEY_SIZE],
}

impl RecordKey {
    /// Creates a key from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Generates a random key. Intended for tests and for nodes that
    /// originate private records.
    #[must_use]
    pub fn random() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; KEY_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Returns the key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
