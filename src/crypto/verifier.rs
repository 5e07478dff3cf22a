//! Master-credential enrollment and verification.
//!
//! At registration a fresh salt is generated and the verification hash
//! is derived from the credential.  Every later proof re-derives the hash
//! from the supplied credential and compares it in constant time.

use subtle::ConstantTimeEq;
use tracing::debug;

use super::kdf::{derive_key_material, generate_salt, Argon2Params, SALT_LEN};
use super::keys::RecordKey;
use crate::errors::{LockerError, Result};

/// Salt and verification hash produced for a new credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub salt: Vec<u8>,
    pub verification_hash: Vec<u8>,
}

impl std::fmt::Debug for Enrollment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enrollment")
            .field("salt_len", &self.salt.len())
            .field("verification_hash", &"[REDACTED]")
            .finish()
    }
}

/// Checks master credentials against stored salt + verification hash.
#[derive(Debug, Clone, Copy)]
pub struct CredentialVerifier {
    params: Argon2Params,
}

impl CredentialVerifier {
    /// Build a verifier, rejecting KDF parameters below the minimum.
    pub fn new(params: Argon2Params) -> Result<Self> {
        params
            .validate()
            .map_err(|e| LockerError::Configuration(e.to_string()))?;
        Ok(Self { params })
    }

    /// Enroll a new credential under a freshly generated salt.
    pub fn register(&self, secret: &[u8]) -> Result<Enrollment> {
        let salt: [u8; SALT_LEN] = generate_salt();
        let material = derive_key_material(secret, &salt, &self.params)?;
        let verification_hash = material.verification_hash()?;

        Ok(Enrollment {
            salt: salt.to_vec(),
            verification_hash: verification_hash.to_vec(),
        })
    }

    /// Returns `true` if `secret` reproduces `expected_hash` under `salt`.
    pub fn verify(&self, secret: &[u8], salt: &[u8], expected_hash: &[u8]) -> Result<bool> {
        let material = derive_key_material(secret, salt, &self.params)?;
        let actual = material.verification_hash()?;
        Ok(actual[..].ct_eq(expected_hash).into())
    }

    /// Prove the credential and hand back the record key in one KDF run.
    ///
    /// A mismatch is `Unauthorized`; nothing about the cause is returned.
    pub fn unlock(&self, secret: &[u8], salt: &[u8], expected_hash: &[u8]) -> Result<RecordKey> {
        let material = derive_key_material(secret, salt, &self.params)?;
        let actual = material.verification_hash()?;

        if !bool::from(actual[..].ct_eq(expected_hash)) {
            debug!("master credential proof failed");
            return Err(LockerError::Unauthorized);
        }

        material.record_key()
    }
}
