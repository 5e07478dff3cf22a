//! Sub-key separation using HKDF-SHA256.
//!
//! The Argon2id output is never used directly.  Two independent values
//! are expanded from it:
//! - the **verification hash** that is stored with the user, and
//! - the **record key** that encrypts vault records.
//!
//! Keeping them apart means the stored verifier cannot be used as an
//! encryption key by someone who can read the user table.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::errors::{LockerError, Result};

/// Length of derived keys (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

const VERIFIER_INFO: &[u8] = b"locker-verifier";
const RECORD_KEY_INFO: &[u8] = b"locker-record-key";

/// Raw Argon2id output, zeroed when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct KeyMaterial {
    bytes: [u8; KEY_LEN],
}

impl KeyMaterial {
    pub(crate) fn zeroed() -> Self {
        Self {
            bytes: [0u8; KEY_LEN],
        }
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KEY_LEN] {
        &mut self.bytes
    }

    /// Access the raw material bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Expand the value stored as the user's verification hash.
    pub fn verification_hash(&self) -> Result<[u8; KEY_LEN]> {
        hkdf_expand(&self.bytes, VERIFIER_INFO)
    }

    /// Expand the key used to seal and open vault records.
    pub fn record_key(&self) -> Result<RecordKey> {
        hkdf_expand(&self.bytes, RECORD_KEY_INFO).map(RecordKey::new)
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyMaterial([REDACTED])")
    }
}

/// The AES-256 key for a user's records.  Lives only for one call.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct RecordKey {
    bytes: [u8; KEY_LEN],
}

impl RecordKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RecordKey([REDACTED])")
    }
}

/// HKDF-SHA256 expand with the given `info`.
///
/// The extract step uses the default zero salt; the input already came
/// out of Argon2id and is uniformly random.
fn hkdf_expand(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| LockerError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}
