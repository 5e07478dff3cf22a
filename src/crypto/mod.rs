//! Cryptographic primitives for Locker.
//!
//! This module provides:
//! - Argon2id key derivation from the master credential (`kdf`)
//! - HKDF separation of verifier and record key (`keys`)
//! - Credential enrollment and constant-time verification (`verifier`)
//! - AES-256-GCM sealing of single record values (`encryption`)

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod verifier;

pub use encryption::{decrypt, encrypt, Sealed, NONCE_LEN};
pub use kdf::{derive_key_material, generate_salt, Argon2Params, SALT_LEN};
pub use keys::{KeyMaterial, RecordKey, KEY_LEN};
pub use verifier::{CredentialVerifier, Enrollment};
