//! Error types for the private-record layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur handling private records.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// No key is resolvable for the record's owner.
    #[error("no key available for owner: {owner}")]
    KeyUnavailable {
        /// Owner identity the resolver was asked for.
        owner: String,
    },

    /// Decryption failed (malformed ciphertext, wrong key, or tampered data).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Key resolution failed (resolver-side fault, not a missing key).
    #[error("key resolution failed: {0}")]
    KeyResolution(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
