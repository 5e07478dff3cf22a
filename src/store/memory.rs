//! In-process store backed by `RwLock<HashMap>`.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{label_matches, RecordStore, UserStore};
use crate::auth::user::User;
use crate::errors::{LockerError, Result};
use crate::vault::record::{SealedUpdate, VaultRecord};

/// A store that keeps everything in memory.  Useful for tests and for
/// embedding the vault in a process that brings its own persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    records: RwLock<HashMap<String, VaultRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn users(&self) -> Result<RwLockReadGuard<'_, HashMap<String, User>>> {
        self.users
            .read()
            .map_err(|_| LockerError::Storage("user map lock poisoned".into()))
    }

    fn users_mut(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, User>>> {
        self.users
            .write()
            .map_err(|_| LockerError::Storage("user map lock poisoned".into()))
    }

    fn records(&self) -> Result<RwLockReadGuard<'_, HashMap<String, VaultRecord>>> {
        self.records
            .read()
            .map_err(|_| LockerError::Storage("record map lock poisoned".into()))
    }

    fn records_mut(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, VaultRecord>>> {
        self.records
            .write()
            .map_err(|_| LockerError::Storage("record map lock poisoned".into()))
    }
}

impl UserStore for MemoryStore {
    fn insert_user(&self, user: &User) -> Result<()> {
        // Check and insert under the same write lock.
        let mut users = self.users_mut()?;
        if users.values().any(|u| u.username == user.username) {
            return Err(LockerError::Conflict("username is already taken".into()));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(LockerError::Conflict("email is already in use".into()));
        }
        if users.contains_key(&user.id) {
            return Err(LockerError::Conflict("user id already exists".into()));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users()?.get(id).cloned())
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users()?
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

impl RecordStore for MemoryStore {
    fn insert_record(&self, record: &VaultRecord) -> Result<()> {
        let mut records = self.records_mut()?;
        if records.contains_key(&record.id) {
            return Err(LockerError::Storage(format!(
                "record id {} already exists",
                record.id
            )));
        }
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn get_record(&self, id: &str) -> Result<Option<VaultRecord>> {
        Ok(self.records()?.get(id).cloned())
    }

    fn replace_sealed(&self, id: &str, update: &SealedUpdate) -> Result<bool> {
        let mut records = self.records_mut()?;
        let Some(record) = records.get_mut(id) else {
            return Ok(false);
        };
        record.metadata = update.metadata.clone();
        record.ciphertext = update.ciphertext.clone();
        record.nonce = update.nonce.clone();
        record.updated_at = update.updated_at;
        Ok(true)
    }

    fn delete_record(&self, id: &str) -> Result<bool> {
        Ok(self.records_mut()?.remove(id).is_some())
    }

    fn records_for_owner(&self, owner_id: &str) -> Result<Vec<VaultRecord>> {
        let mut list: Vec<VaultRecord> = self
            .records()?
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        list.sort_by(by_label);
        Ok(list)
    }

    fn search_owner_records(&self, owner_id: &str, query: &str) -> Result<Vec<VaultRecord>> {
        let mut list: Vec<VaultRecord> = self
            .records()?
            .values()
            .filter(|r| r.owner_id == owner_id && label_matches(&r.metadata.label, query))
            .cloned()
            .collect();
        list.sort_by(by_label);
        Ok(list)
    }
}

/// Same order as the SQLite store: label, then id.
fn by_label(a: &VaultRecord, b: &VaultRecord) -> std::cmp::Ordering {
    (&a.metadata.label, &a.id).cmp(&(&b.metadata.label, &b.id))
}
