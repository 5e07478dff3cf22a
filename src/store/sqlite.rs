//! SQLite-backed store.
//!
//! One database file holds both tables.  Username and email uniqueness
//! is enforced by `UNIQUE` constraints; record updates are a single
//! `UPDATE` statement so sealed content and nonce change together.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::{label_matches, RecordStore, UserStore};
use crate::auth::user::User;
use crate::errors::{LockerError, Result};
use crate::vault::record::{RecordMetadata, SealedUpdate, VaultRecord};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id                TEXT PRIMARY KEY,
    username          TEXT NOT NULL UNIQUE,
    email             TEXT NOT NULL UNIQUE,
    salt              BLOB NOT NULL,
    verification_hash BLOB NOT NULL,
    created_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS records (
    id           TEXT PRIMARY KEY,
    owner_id     TEXT NOT NULL REFERENCES users(id),
    label        TEXT NOT NULL,
    account_name TEXT NOT NULL,
    notes        TEXT,
    ciphertext   BLOB NOT NULL,
    nonce        BLOB NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS records_owner ON records(owner_id);
";

const RECORD_COLUMNS: &str =
    "id, owner_id, label, account_name, notes, ciphertext, nonce, created_at, updated_at";

const USER_COLUMNS: &str = "id, username, email, salt, verification_hash, created_at";

/// A store persisted in a single SQLite file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    ///
    /// The parent directory is created if needed and, on Unix, the file
    /// is restricted to the owner.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        debug!(path = %path.display(), "opened record database");
        Self::init(conn)
    }

    /// A throwaway database that lives only as long as the store.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| LockerError::Storage("database lock poisoned".into()))
    }
}

impl UserStore for SqliteStore {
    fn insert_user(&self, user: &User) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let username_taken: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
            params![user.username],
            |row| row.get(0),
        )?;
        if username_taken {
            return Err(LockerError::Conflict("username is already taken".into()));
        }

        let email_taken: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
            params![user.email],
            |row| row.get(0),
        )?;
        if email_taken {
            return Err(LockerError::Conflict("email is already in use".into()));
        }

        tx.execute(
            "INSERT INTO users (id, username, email, salt, verification_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.username,
                user.email,
                user.salt,
                user.verification_hash,
                format_ts(&user.created_at),
            ],
        )
        .map_err(map_constraint)?;

        tx.commit()?;
        Ok(())
    }

    fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }
}

impl RecordStore for SqliteStore {
    fn insert_record(&self, record: &VaultRecord) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO records ({RECORD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ),
            params![
                record.id,
                record.owner_id,
                record.metadata.label,
                record.metadata.account_name,
                record.metadata.notes,
                record.ciphertext,
                record.nonce,
                format_ts(&record.created_at),
                format_ts(&record.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_record(&self, id: &str) -> Result<Option<VaultRecord>> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM records WHERE id = ?1"),
                params![id],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn replace_sealed(&self, id: &str, update: &SealedUpdate) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE records
             SET label = ?2, account_name = ?3, notes = ?4,
                 ciphertext = ?5, nonce = ?6, updated_at = ?7
             WHERE id = ?1",
            params![
                id,
                update.metadata.label,
                update.metadata.account_name,
                update.metadata.notes,
                update.ciphertext,
                update.nonce,
                format_ts(&update.updated_at),
            ],
        )?;
        Ok(changed == 1)
    }

    fn delete_record(&self, id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM records WHERE id = ?1", params![id])?;
        Ok(changed == 1)
    }

    fn records_for_owner(&self, owner_id: &str) -> Result<Vec<VaultRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM records WHERE owner_id = ?1 ORDER BY label, id"
        ))?;
        let rows = stmt.query_map(params![owner_id], record_from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn search_owner_records(&self, owner_id: &str, query: &str) -> Result<Vec<VaultRecord>> {
        // SQLite's lower() only folds ASCII, so the match runs here.
        Ok(self
            .records_for_owner(owner_id)?
            .into_iter()
            .filter(|r| label_matches(&r.metadata.label, query))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        salt: row.get(3)?,
        verification_hash: row.get(4)?,
        created_at: parse_ts(row, 5)?,
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<VaultRecord> {
    Ok(VaultRecord {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        metadata: RecordMetadata {
            label: row.get(2)?,
            account_name: row.get(3)?,
            notes: row.get(4)?,
        },
        ciphertext: row.get(5)?,
        nonce: row.get(6)?,
        created_at: parse_ts(row, 7)?,
        updated_at: parse_ts(row, 8)?,
    })
}

/// A `UNIQUE` violation that slipped past the pre-checks is still a
/// conflict, not a storage failure.
fn map_constraint(e: rusqlite::Error) -> LockerError {
    match e {
        rusqlite::Error::SqliteFailure(ref err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            LockerError::Conflict("username or email is already registered".into())
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn user(id: &str, name: &str, email: &str) -> User {
        User {
            id: id.into(),
            username: name.into(),
            email: email.into(),
            salt: vec![1; 16],
            verification_hash: vec![2; 32],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn open_creates_database_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("locker.db");
        let _store = SqliteStore::open(&path).unwrap();
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn database_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locker.db");
        let _store = SqliteStore::open(&path).unwrap();

        let perms = std::fs::metadata(&path).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }

    #[test]
    fn user_roundtrip_preserves_timestamp() {
        let store = SqliteStore::open_in_memory().unwrap();
        let alice = user("u1", "alice", "alice@x.com");
        store.insert_user(&alice).unwrap();

        let found = store.find_user_by_username("alice").unwrap().unwrap();
        assert_eq!(found, alice);
        assert_eq!(store.find_user_by_id("u1").unwrap().unwrap(), alice);
        assert!(store.find_user_by_username("bob").unwrap().is_none());
    }

    #[test]
    fn record_for_unknown_owner_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let now = Utc::now();
        let record = VaultRecord {
            id: "r1".into(),
            owner_id: "ghost".into(),
            metadata: RecordMetadata::new("site", "acct", None),
            ciphertext: vec![1],
            nonce: vec![0; 12],
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(
            store.insert_record(&record),
            Err(LockerError::Storage(_))
        ));
    }
}
