//! Persistence boundary for users and vault records.
//!
//! The rest of the crate only talks to the `UserStore` and `RecordStore`
//! traits.  Two implementations ship with the crate:
//! - `MemoryStore`, a lock-guarded in-process map (`memory`)
//! - `SqliteStore`, a single-file SQLite database (`sqlite`)
//!
//! Both replace a record's ciphertext, nonce, metadata and `updated_at`
//! as one unit; no reader can see a ciphertext paired with a nonce it
//! was not produced under.

pub mod memory;
pub mod sqlite;

use crate::auth::user::User;
use crate::errors::Result;
use crate::vault::record::{SealedUpdate, VaultRecord};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage for registered users.
pub trait UserStore: Send + Sync {
    /// Insert a new user.
    ///
    /// Fails with `Conflict` if the username or email is already taken,
    /// leaving existing state untouched.
    fn insert_user(&self, user: &User) -> Result<()>;

    fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// Storage for sealed vault records.
pub trait RecordStore: Send + Sync {
    fn insert_record(&self, record: &VaultRecord) -> Result<()>;

    fn get_record(&self, id: &str) -> Result<Option<VaultRecord>>;

    /// Atomically replace the sealed content and metadata of a record.
    ///
    /// Returns `false` if the record no longer exists.
    fn replace_sealed(&self, id: &str, update: &SealedUpdate) -> Result<bool>;

    /// Returns `false` if there was nothing to delete.
    fn delete_record(&self, id: &str) -> Result<bool>;

    /// All records owned by `owner_id`, ordered by label.
    fn records_for_owner(&self, owner_id: &str) -> Result<Vec<VaultRecord>>;

    /// Records owned by `owner_id` whose label contains `query`,
    /// ignoring case, ordered by label.
    fn search_owner_records(&self, owner_id: &str, query: &str) -> Result<Vec<VaultRecord>>;
}

/// Case-insensitive substring match used by both store implementations.
pub(crate) fn label_matches(label: &str, query: &str) -> bool {
    label.to_lowercase().contains(&query.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_match_ignores_case() {
        assert!(label_matches("Example.COM", "example"));
        assert!(label_matches("github.com", "HUB"));
        assert!(!label_matches("github.com", "gitlab"));
    }
}
