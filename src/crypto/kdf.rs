//! Password-based key derivation using Argon2id.
//!
//! Turns a master credential plus a per-user salt into 32 bytes of key
//! material.  The function is deterministic: the same credential, salt
//! and parameters always give the same output, which is what lets the
//! vault re-derive its key on every access instead of storing it.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use super::keys::{KeyMaterial, KEY_LEN};
use crate::errors::{LockerError, Result};

/// Length of the per-user salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Configurable Argon2id parameters.
///
/// These map 1:1 to the fields in `Settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    /// Check the parameters against the minimum work factor.
    pub fn validate(&self) -> Result<()> {
        if self.memory_kib < MIN_MEMORY_KIB {
            return Err(LockerError::KeyDerivationFailed(format!(
                "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if self.iterations < 1 {
            return Err(LockerError::KeyDerivationFailed(
                "Argon2 iterations must be at least 1".into(),
            ));
        }
        if self.parallelism < 1 {
            return Err(LockerError::KeyDerivationFailed(
                "Argon2 parallelism must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Derive 32 bytes of key material from a secret and salt.
///
/// Refuses parameters weaker than the enforced minimum.
pub fn derive_key_material(
    secret: &[u8],
    salt: &[u8],
    argon2_params: &Argon2Params,
) -> Result<KeyMaterial> {
    argon2_params.validate()?;

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| LockerError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut material = KeyMaterial::zeroed();
    argon2
        .hash_password_into(secret, salt, material.as_mut_bytes())
        .map_err(|e| LockerError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(material)
}

/// Generate a cryptographically random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> Argon2Params {
        Argon2Params {
            memory_kib: 8_192,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn derivation_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key_material(b"Secret123!", &salt, &fast()).unwrap();
        let b = derive_key_material(b"Secret123!", &salt, &fast()).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_salt_gives_different_material() {
        let a = derive_key_material(b"Secret123!", &[1u8; SALT_LEN], &fast()).unwrap();
        let b = derive_key_material(b"Secret123!", &[2u8; SALT_LEN], &fast()).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn weak_memory_cost_is_rejected() {
        let params = Argon2Params {
            memory_kib: 1_024,
            ..fast()
        };
        let result = derive_key_material(b"pw", &[0u8; SALT_LEN], &params);
        assert!(matches!(result, Err(LockerError::KeyDerivationFailed(_))));
    }

    #[test]
    fn zero_iterations_are_rejected() {
        let params = Argon2Params {
            iterations: 0,
            ..fast()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
