//! The encrypted wire envelope.
//!
//! An encrypted record replaces its open `data` map with three opaque
//! base64 strings: the ciphertext, the AES-GCM iv (96 bits), and the
//! detached authentication tag (128 bits).

use crate::error::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Size of the AES-GCM iv in bytes.
pub const IV_SIZE: usize = 12;

/// Size of the authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// The `data` block of an encrypted record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    /// Base64 ciphertext (without the tag).
    pub encrypted: String,
    /// Base64 iv, decodes to [`IV_SIZE`] bytes.
    pub iv: String,
    /// Base64 authentication tag, decodes to [`TAG_SIZE`] bytes.
    pub tag: String,
}

impl EncryptedEnvelope {
    /// Extracts the envelope from a raw encrypted record.
    ///
    /// Callers should have checked `is_encrypted_record` first; this
    /// re-validates the field shape so a malformed record fails with
    /// `Decryption` rather than panicking downstream.
    pub fn from_record(record: &Value) -> CryptoResult<Self> {
        let data = record
            .get("data")
            .cloned()
            .ok_or_else(|| CryptoError::Decryption("record has no data block".to_string()))?;
        serde_json::from_value(data)
            .map_err(|e| CryptoError::Decryption(format!("malformed envelope: {e}")))
    }

    /// Decodes the three fields, enforcing iv and tag lengths.
    pub fn decode(&self) -> CryptoResult<(Vec<u8>, [u8; IV_SIZE], [u8; TAG_SIZE])> {
        let ciphertext = decode_field("encrypted", &self.encrypted)?;
        let iv_bytes = decode_field("iv", &self.iv)?;
        let tag_bytes = decode_field("tag", &self.tag)?;

        let iv: [u8; IV_SIZE] = iv_bytes.try_into().map_err(|v: Vec<u8>| {
            CryptoError::Decryption(format!("iv must be {IV_SIZE} bytes, got {}", v.len()))
        })?;
        let tag: [u8; TAG_SIZE] = tag_bytes.try_into().map_err(|v: Vec<u8>| {
            CryptoError::Decryption(format!("tag must be {TAG_SIZE} bytes, got {}", v.len()))
        })?;

        Ok((ciphertext, iv, tag))
    }

    /// Builds raw envelope fields from decrypt-ready parts.
    #[must_use]
    pub fn from_parts(ciphertext: &[u8], iv: &[u8; IV_SIZE], tag: &[u8; TAG_SIZE]) -> Self {
        Self {
            encrypted: STANDARD.encode(ciphertext),
            iv: STANDARD.encode(iv),
            tag: STANDARD.encode(tag),
        }
    }

    /// Wraps the envelope in the full wire shape of an encrypted record.
    #[must_use]
    pub fn to_wire(&self, owner: &str) -> Value {
        json!({
            "meta": { "encrypted": true, "owner": owner },
            "data": {
                "encrypted": self.encrypted,
                "iv": self.iv,
                "tag": self.tag,
            },
        })
    }
}

fn decode_field(name: &str, value: &str) -> CryptoResult<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| CryptoError::Decryption(format!("invalid base64 in {name}: {e}")))
}
