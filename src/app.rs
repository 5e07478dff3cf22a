//! Process-level wiring.
//!
//! `Locker` builds every component once from `Settings` and hands the
//! collaborators to each other explicitly.  Nothing here is global.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::auth::{AccountService, Principal, SessionGate, SigningKey};
use crate::config::Settings;
use crate::crypto::CredentialVerifier;
use crate::errors::Result;
use crate::store::{RecordStore, SqliteStore, UserStore};
use crate::vault::VaultManager;

/// The composed application: accounts, sessions and the vault.
pub struct Locker {
    settings: Settings,
    data_path: PathBuf,
    accounts: AccountService,
    vault: VaultManager,
}

impl Locker {
    /// Open the on-disk locker for `project_dir`.
    ///
    /// Loads `.locker.toml`, opens (or creates) the SQLite database and
    /// the session signing key under the data directory.
    pub fn open(project_dir: &Path, data_dir_override: Option<&str>) -> Result<Self> {
        let settings = Settings::load(project_dir)?;
        let data_path = settings.data_path(project_dir, data_dir_override);

        if !data_path.exists() {
            std::fs::create_dir_all(&data_path)?;
        }

        let store = Arc::new(SqliteStore::open(&settings.database_path(&data_path))?);
        let signing_key = SigningKey::load_or_generate(&settings.signing_key_path(&data_path))?;
        debug!(data_path = %data_path.display(), "locker opened");

        Self::with_stores(settings, data_path, store.clone(), store, signing_key)
    }

    /// Compose a locker from caller-supplied stores and signing key.
    pub fn with_stores(
        settings: Settings,
        data_path: PathBuf,
        users: Arc<dyn UserStore>,
        records: Arc<dyn RecordStore>,
        signing_key: SigningKey,
    ) -> Result<Self> {
        settings.validate()?;

        let verifier = CredentialVerifier::new(settings.argon2_params())?;
        let gate = SessionGate::new(signing_key, settings.session_ttl())?;

        let accounts = AccountService::new(users.clone(), verifier, gate);
        let vault = VaultManager::new(users, records, verifier);

        Ok(Self {
            settings,
            data_path,
            accounts,
            vault,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    pub fn vault(&self) -> &VaultManager {
        &self.vault
    }

    /// Resolve a bearer token to the principal it names.
    pub fn authenticate(&self, token: &str) -> Result<Principal> {
        self.accounts.authenticate(token)
    }

    /// Where `login` keeps the current session token.
    pub fn token_path(&self) -> PathBuf {
        self.settings.token_path(&self.data_path)
    }
}
