//! Record lifecycle: create, read, update, delete, list and search.
//!
//! Every operation acts on behalf of a `Principal` that the session gate
//! has already validated.  Operations touching secret content also take
//! the master credential and re-derive the record key for that one call;
//! neither the key nor the plaintext outlives the call.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::record::{
    validate_secret, RecordMetadata, RecordSummary, RecordView, SealedUpdate, VaultRecord,
};
use crate::auth::Principal;
use crate::crypto::{decrypt, encrypt, CredentialVerifier, RecordKey, Sealed};
use crate::errors::{LockerError, Result};
use crate::store::{RecordStore, UserStore};

/// Orchestrates sealed record storage for authenticated principals.
pub struct VaultManager {
    users: Arc<dyn UserStore>,
    records: Arc<dyn RecordStore>,
    verifier: CredentialVerifier,
}

impl VaultManager {
    pub fn new(
        users: Arc<dyn UserStore>,
        records: Arc<dyn RecordStore>,
        verifier: CredentialVerifier,
    ) -> Self {
        Self {
            users,
            records,
            verifier,
        }
    }

    // ------------------------------------------------------------------
    // Secret-bearing operations
    // ------------------------------------------------------------------

    /// Seal `secret` and store it as a new record owned by `principal`.
    pub fn create(
        &self,
        principal: &Principal,
        secret: &str,
        metadata: RecordMetadata,
        master_password: &str,
    ) -> Result<RecordSummary> {
        validate_secret(secret)?;
        metadata.validate()?;
        require_master_password(master_password)?;

        let key = self.unlock(principal, master_password)?;
        let sealed = encrypt(key.as_bytes(), secret.as_bytes())?;
        drop(key);

        let now = Utc::now();
        let record = VaultRecord {
            id: Uuid::new_v4().to_string(),
            owner_id: principal.id.clone(),
            metadata,
            ciphertext: sealed.ciphertext,
            nonce: sealed.nonce.to_vec(),
            created_at: now,
            updated_at: now,
        };

        self.records.insert_record(&record)?;
        info!(record_id = %record.id, owner_id = %principal.id, "record created");
        Ok(record.summary())
    }

    /// Decrypt and return one record.
    ///
    /// Absent and foreign records are both `NotFound`, decided before the
    /// credential is checked.  A cipher failure is `Unauthorized`.
    pub fn read(
        &self,
        principal: &Principal,
        record_id: &str,
        master_password: &str,
    ) -> Result<RecordView> {
        require_master_password(master_password)?;
        let record = self.owned_record(principal, record_id)?;

        let key = self.unlock(principal, master_password)?;
        let plaintext = open_record(&key, &record)?;
        drop(key);

        let secret = String::from_utf8(plaintext.to_vec()).map_err(|e| {
            drop(Zeroizing::new(e.into_bytes()));
            warn!(record_id = %record.id, "decrypted secret is not valid UTF-8");
            LockerError::Unauthorized
        })?;

        debug!(record_id = %record.id, "record read");
        Ok(RecordView {
            id: record.id,
            label: record.metadata.label,
            account_name: record.metadata.account_name,
            secret: Zeroizing::new(secret),
            notes: record.metadata.notes,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Re-seal a record with a new secret and metadata.
    ///
    /// A fresh nonce is always generated; ciphertext, nonce, metadata and
    /// `updated_at` are replaced in one store call.
    pub fn update(
        &self,
        principal: &Principal,
        record_id: &str,
        new_secret: &str,
        new_metadata: RecordMetadata,
        master_password: &str,
    ) -> Result<RecordSummary> {
        validate_secret(new_secret)?;
        new_metadata.validate()?;
        require_master_password(master_password)?;

        let record = self.owned_record(principal, record_id)?;
        let key = self.unlock(principal, master_password)?;
        let sealed = seal_with_fresh_nonce(&key, new_secret.as_bytes(), &record.nonce)?;
        drop(key);

        let update = SealedUpdate {
            metadata: new_metadata,
            ciphertext: sealed.ciphertext,
            nonce: sealed.nonce.to_vec(),
            updated_at: next_timestamp(record.updated_at, Utc::now()),
        };

        if !self.records.replace_sealed(&record.id, &update)? {
            // Deleted between load and replace.
            return Err(LockerError::NotFound);
        }

        info!(record_id = %record.id, owner_id = %principal.id, "record updated");
        Ok(RecordSummary {
            id: record.id,
            label: update.metadata.label,
            account_name: update.metadata.account_name,
            notes: update.metadata.notes,
            created_at: record.created_at,
            updated_at: update.updated_at,
        })
    }

    // ------------------------------------------------------------------
    // Metadata-only operations
    // ------------------------------------------------------------------

    /// Remove a record.  Only ownership is checked; no credential proof.
    pub fn delete(&self, principal: &Principal, record_id: &str) -> Result<()> {
        let record = self.owned_record(principal, record_id)?;
        if !self.records.delete_record(&record.id)? {
            return Err(LockerError::NotFound);
        }
        info!(record_id = %record.id, owner_id = %principal.id, "record deleted");
        Ok(())
    }

    /// Metadata of one owned record, without touching the ciphertext.
    pub fn summary(&self, principal: &Principal, record_id: &str) -> Result<RecordSummary> {
        Ok(self.owned_record(principal, record_id)?.summary())
    }

    /// Metadata of every record the principal owns.
    pub fn list(&self, principal: &Principal) -> Result<Vec<RecordSummary>> {
        Ok(self
            .records
            .records_for_owner(&principal.id)?
            .iter()
            .map(VaultRecord::summary)
            .collect())
    }

    /// Metadata of owned records whose label contains `query` (any case).
    ///
    /// A blank query matches everything, like [`list`](Self::list).
    pub fn search(&self, principal: &Principal, query: &str) -> Result<Vec<RecordSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list(principal);
        }
        Ok(self
            .records
            .search_owner_records(&principal.id, query)?
            .iter()
            .map(VaultRecord::summary)
            .collect())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Load a record, hiding both absence and foreign ownership as `NotFound`.
    fn owned_record(&self, principal: &Principal, record_id: &str) -> Result<VaultRecord> {
        match self.records.get_record(record_id)? {
            Some(record) if record.owner_id == principal.id => Ok(record),
            Some(_) => {
                debug!(record_id, requester = %principal.id, "record owned by another user");
                Err(LockerError::NotFound)
            }
            None => Err(LockerError::NotFound),
        }
    }

    /// Prove the master credential against the owner's stored verifier
    /// and derive the record key.
    fn unlock(&self, principal: &Principal, master_password: &str) -> Result<RecordKey> {
        let user = self
            .users
            .find_user_by_id(&principal.id)?
            .ok_or(LockerError::Unauthorized)?;

        self.verifier
            .unlock(
                master_password.as_bytes(),
                &user.salt,
                &user.verification_hash,
            )
            .map_err(|e| match e {
                LockerError::Unauthorized => {
                    warn!(user_id = %principal.id, "master credential rejected");
                    LockerError::Unauthorized
                }
                LockerError::KeyDerivationFailed(msg) => LockerError::Configuration(msg),
                other => other,
            })
    }
}

fn require_master_password(master_password: &str) -> Result<()> {
    if master_password.is_empty() {
        return Err(LockerError::Validation(
            "master password is required".into(),
        ));
    }
    Ok(())
}

/// Decrypt a record's sealed value; any cipher failure is `Unauthorized`.
fn open_record(key: &RecordKey, record: &VaultRecord) -> Result<Zeroizing<Vec<u8>>> {
    if !record.has_valid_nonce() {
        warn!(record_id = %record.id, nonce_len = record.nonce.len(), "stored nonce is malformed");
        return Err(LockerError::Unauthorized);
    }
    decrypt(key.as_bytes(), &record.ciphertext, &record.nonce).map_err(|e| {
        warn!(record_id = %record.id, error = %e, "record failed authentication");
        LockerError::Unauthorized
    })
}

/// Seal `plaintext`, guaranteeing the nonce differs from `previous_nonce`.
fn seal_with_fresh_nonce(key: &RecordKey, plaintext: &[u8], previous_nonce: &[u8]) -> Result<Sealed> {
    loop {
        let sealed = encrypt(key.as_bytes(), plaintext)?;
        if sealed.nonce[..] != *previous_nonce {
            return Ok(sealed);
        }
    }
}

/// `updated_at` always moves strictly forward, even if the clock does not.
fn next_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_timestamp_moves_forward() {
        let t = Utc::now();
        assert_eq!(next_timestamp(t, t + Duration::seconds(1)), t + Duration::seconds(1));
        assert!(next_timestamp(t, t) > t);
        assert!(next_timestamp(t, t - Duration::seconds(5)) > t);
    }

    #[test]
    fn fresh_nonce_differs_from_previous() {
        let key = RecordKey::new([3u8; 32]);
        let first = encrypt(key.as_bytes(), b"one").unwrap();
        let second = seal_with_fresh_nonce(&key, b"two", &first.nonce).unwrap();
        assert_ne!(first.nonce, second.nonce);
    }
}
