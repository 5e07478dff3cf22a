//! The HMAC key that signs session tokens.
//!
//! A signing key is a 32-byte random file kept next to the database.
//! It is created on first use with owner-only permissions and loaded on
//! every later start.  Losing or replacing it invalidates every session.

use std::fs;
use std::path::Path;

use rand::RngCore;
use zeroize::Zeroize;

use crate::errors::{LockerError, Result};

/// Expected length of a signing key in bytes (256 bits).
pub const SIGNING_KEY_LEN: usize = 32;

/// Session signing key, zeroed when dropped.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SigningKey {
    bytes: [u8; SIGNING_KEY_LEN],
}

impl SigningKey {
    pub fn new(bytes: [u8; SIGNING_KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// A fresh random key that is never written anywhere.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SIGNING_KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Load the key at `path`, generating and writing it if missing.
    pub fn load_or_generate(path: &Path) -> Result<Self> {
        if path.exists() {
            load_signing_key(path)
        } else {
            generate_signing_key(path)
        }
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey([REDACTED])")
    }
}

/// Generate a new random signing key and write it to `path`.
///
/// The file is written with restrictive permissions (owner-only read).
pub fn generate_signing_key(path: &Path) -> Result<SigningKey> {
    if path.exists() {
        return Err(LockerError::SessionKey(format!(
            "signing key already exists at {}",
            path.display()
        )));
    }

    let key = SigningKey::generate();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                LockerError::SessionKey(format!("cannot create signing key directory: {e}"))
            })?;
        }
    }

    fs::write(path, key.as_bytes())
        .map_err(|e| LockerError::SessionKey(format!("failed to write signing key: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, perms).map_err(|e| {
            LockerError::SessionKey(format!("failed to set signing key permissions: {e}"))
        })?;
    }

    Ok(key)
}

/// Load a signing key from disk and validate its length.
pub fn load_signing_key(path: &Path) -> Result<SigningKey> {
    let mut data = fs::read(path)
        .map_err(|e| LockerError::SessionKey(format!("failed to read signing key: {e}")))?;

    if data.len() != SIGNING_KEY_LEN {
        let len = data.len();
        data.zeroize();
        return Err(LockerError::SessionKey(format!(
            "signing key must be exactly {SIGNING_KEY_LEN} bytes, got {len}"
        )));
    }

    let mut bytes = [0u8; SIGNING_KEY_LEN];
    bytes.copy_from_slice(&data);
    data.zeroize();
    Ok(SigningKey::new(bytes))
}
