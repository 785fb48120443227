//! Private-record detection, decryption, and post-decryption validation.
//!
//! Decryption is all-or-nothing: a record either decrypts to a complete
//! JSON payload that passes the second validation gate, or it is
//! rejected. There is no partial decryption.

use crate::envelope::{EncryptedEnvelope, IV_SIZE, TAG_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::key::RecordKey;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use async_trait::async_trait;
use gunsync_types::RECOGNIZED_SECTIONS;
use rand::RngCore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves encryption keys for record owners.
///
/// Key management lives in an external key service; the engine only ever
/// asks "is there a key for this owner". `Ok(None)` means no key exists
/// (a per-record skip); `Err` means the resolver itself failed.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Looks up the key for an owner identity.
    async fn resolve_key(&self, owner: &str) -> CryptoResult<Option<RecordKey>>;
}

/// A fixed in-memory key table. Useful in tests and for single-tenant
/// deployments where keys are provisioned at startup.
#[derive(Default)]
pub struct StaticKeyResolver {
    keys: HashMap<String, RecordKey>,
}

impl StaticKeyResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key for an owner.
    pub fn insert(&mut self, owner: impl Into<String>, key: RecordKey) {
        self.keys.insert(owner.into(), key);
    }

    /// Builder-style variant of [`insert`](Self::insert).
    #[must_use]
    pub fn with_key(mut self, owner: impl Into<String>, key: RecordKey) -> Self {
        self.insert(owner, key);
        self
    }
}

#[async_trait]
impl KeyResolver for StaticKeyResolver {
    async fn resolve_key(&self, owner: &str) -> CryptoResult<Option<RecordKey>> {
        Ok(self.keys.get(owner).cloned())
    }
}

/// Handles the encrypted-record path of a sync cycle.
pub struct PrivateRecordHandler {
    keys: Arc<dyn KeyResolver>,
}

impl PrivateRecordHandler {
    /// Creates a handler backed by the given key resolver.
    pub fn new(keys: Arc<dyn KeyResolver>) -> Self {
        Self { keys }
    }

    /// Decrypts an encrypted record into its plaintext JSON payload.
    ///
    /// Fails with `KeyUnavailable` when no key resolves for the record's
    /// owner, and with `Decryption` on malformed envelope fields or an
    /// authentication-tag mismatch.
    pub async fn decrypt_record(&self, record: &Value) -> CryptoResult<Value> {
        let owner = owner_identity(record).ok_or_else(|| CryptoError::KeyUnavailable {
            owner: "<unknown>".to_string(),
        })?;
        let key = self
            .keys
            .resolve_key(owner)
            .await?
            .ok_or_else(|| CryptoError::KeyUnavailable {
                owner: owner.to_string(),
            })?;

        let envelope = EncryptedEnvelope::from_record(record)?;
        decrypt(&key, &envelope)
    }
}

/// Extracts the owner identity used for key resolution: the creator's
/// public key when the envelope carries an `oip` block, else
/// `meta.owner`.
#[must_use]
pub fn owner_identity(record: &Value) -> Option<&str> {
    record
        .pointer("/oip/creator/publicKey")
        .and_then(Value::as_str)
        .or_else(|| record.pointer("/meta/owner").and_then(Value::as_str))
}

/// Decrypts an envelope with an explicit key.
///
/// The detached tag is re-appended to the ciphertext for the AEAD, which
/// verifies it before releasing any plaintext.
pub fn decrypt(key: &RecordKey, envelope: &EncryptedEnvelope) -> CryptoResult<Value> {
    let (mut ciphertext, iv, tag) = envelope.decode()?;
    ciphertext.extend_from_slice(&tag);

    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&iv), ciphertext.as_ref())
        .map_err(|_| {
            CryptoError::Decryption("authentication failed (wrong key or tampered data)".to_string())
        })?;

    serde_json::from_slice(&plaintext)
        .map_err(|e| CryptoError::Decryption(format!("plaintext is not valid JSON: {e}")))
}

/// Encrypts a plaintext record payload into an envelope with a fresh
/// random iv. Inverse of [`decrypt`]; used by nodes that originate
/// private records and by tests.
pub fn encrypt(key: &RecordKey, record: &Value) -> CryptoResult<EncryptedEnvelope> {
    let plaintext = serde_json::to_vec(record)?;

    let mut iv = [0u8; IV_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut iv);

    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let mut sealed = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext.as_ref())
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    // The AEAD appends the tag; the wire format carries it detached.
    let tag_start = sealed.len() - TAG_SIZE;
    let tag: [u8; TAG_SIZE] = sealed[tag_start..]
        .try_into()
        .map_err(|_| CryptoError::Encryption("ciphertext shorter than tag".to_string()))?;
    sealed.truncate(tag_start);

    Ok(EncryptedEnvelope::from_parts(&sealed, &iv, &tag))
}

/// Second validation gate, applied after decryption: the payload's
/// `data` must be a non-null object containing at least one recognized
/// section. Independent of `is_valid_oip_record` because decrypted
/// payloads may omit the outer `oip` metadata block.
#[must_use]
pub fn validate_decrypted_record(record: &Value) -> bool {
    let Some(data) = record.get("data").and_then(Value::as_object) else {
        return false;
    };
    RECOGNIZED_SECTIONS
        .iter()
        .any(|section| data.contains_key(*section))
}
