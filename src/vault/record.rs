//! Vault record types.
//!
//! A `VaultRecord` is what the store holds: sealed secret bytes, the
//! nonce they were sealed under, and plaintext metadata.  The byte fields
//! use custom serde helpers so they serialize as base64 strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::NONCE_LEN;
use crate::errors::{LockerError, Result};

/// Upper bound for label and account name lengths.
const MAX_FIELD_LEN: usize = 256;

/// Upper bound for notes.
const MAX_NOTES_LEN: usize = 4_096;

/// Upper bound for the secret value itself.
const MAX_SECRET_LEN: usize = 4_096;

/// Unencrypted descriptive fields of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Site or service the secret belongs to (e.g. "example.com").
    pub label: String,

    /// Account name at that site.
    pub account_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RecordMetadata {
    pub fn new(label: &str, account_name: &str, notes: Option<&str>) -> Self {
        Self {
            label: label.trim().to_string(),
            account_name: account_name.trim().to_string(),
            notes: notes
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        }
    }

    /// Required fields must be non-empty and every field bounded.
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(LockerError::Validation("label cannot be empty".into()));
        }
        if self.account_name.trim().is_empty() {
            return Err(LockerError::Validation(
                "account name cannot be empty".into(),
            ));
        }
        if self.label.len() > MAX_FIELD_LEN || self.account_name.len() > MAX_FIELD_LEN {
            return Err(LockerError::Validation(format!(
                "label and account name cannot exceed {MAX_FIELD_LEN} characters"
            )));
        }
        if self.notes.as_ref().is_some_and(|n| n.len() > MAX_NOTES_LEN) {
            return Err(LockerError::Validation(format!(
                "notes cannot exceed {MAX_NOTES_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// Check a plaintext secret before it is sealed.
pub fn validate_secret(secret: &str) -> Result<()> {
    if secret.is_empty() {
        return Err(LockerError::Validation("secret cannot be empty".into()));
    }
    if secret.len() > MAX_SECRET_LEN {
        return Err(LockerError::Validation(format!(
            "secret cannot exceed {MAX_SECRET_LEN} bytes"
        )));
    }
    Ok(())
}

/// A stored record as the persistence layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRecord {
    pub id: String,

    /// Id of the owning user.  Never empty.
    pub owner_id: String,

    #[serde(flatten)]
    pub metadata: RecordMetadata,

    /// AES-256-GCM ciphertext including the auth tag.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,

    /// The nonce `ciphertext` was produced under.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub nonce: Vec<u8>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VaultRecord {
    /// Metadata-only projection.
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            id: self.id.clone(),
            label: self.metadata.label.clone(),
            account_name: self.metadata.account_name.clone(),
            notes: self.metadata.notes.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Whether the stored nonce has the length the cipher requires.
    pub fn has_valid_nonce(&self) -> bool {
        self.nonce.len() == NONCE_LEN
    }
}

/// The unit the store replaces atomically on update.
///
/// Ciphertext and nonce only ever travel together through this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedUpdate {
    pub metadata: RecordMetadata,
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
    pub updated_at: DateTime<Utc>,
}

/// List/search output: no ciphertext, no plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    pub id: String,
    pub label: String,
    pub account_name: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read output with the decrypted secret.
///
/// The secret is wiped from memory when the view is dropped.
#[derive(Clone)]
pub struct RecordView {
    pub id: String,
    pub label: String,
    pub account_name: String,
    pub secret: Zeroizing<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for RecordView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordView")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("account_name", &self.account_name)
            .field("secret", &"[REDACTED]")
            .field("notes", &self.notes)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
