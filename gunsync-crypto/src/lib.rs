//! Private-record handling for gunsync.
//!
//! Records in the graph store may be end-to-end encrypted: the open
//! `data` map is replaced by an AES-256-GCM envelope
//! (`{encrypted, iv, tag}`, all base64) and `meta.encrypted` is set.
//! Before such a record can be indexed it must be decrypted with the
//! owner's key and re-validated.
//!
//! Key management is out of scope — keys are supplied by an external key
//! service behind the [`KeyResolver`] trait.

mod envelope;
mod error;
mod handler;
mod key;

pub use envelope::{EncryptedEnvelope, IV_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use handler::{
    decrypt, encrypt, owner_identity, validate_decrypted_record, KeyResolver,
    PrivateRecordHandler, StaticKeyResolver,
};
pub use key::{RecordKey, KEY_SIZE};
