use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::Argon2Params;
use crate::errors::{LockerError, Result};
use crate::vault::generator;

/// Project-level configuration, loaded from `.locker.toml`.
///
/// Every field has a sensible default so Locker works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) holding the database,
    /// signing key and saved session token.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Database file name inside `data_dir`.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Session token lifetime in minutes (default: 10 hours).
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: i64,

    /// Length of passwords produced by `--generate` (default: 16).
    #[serde(default = "default_generated_password_length")]
    pub generated_password_length: usize,
}

/// Longest accepted session lifetime (one year).
const MAX_SESSION_TTL_MINUTES: i64 = 525_600;

// ── Serde default helpers ────────────────────────────────────────────

fn default_data_dir() -> String {
    ".locker".to_string()
}

fn default_database_file() -> String {
    "locker.db".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_session_ttl_minutes() -> i64 {
    600
}

fn default_generated_password_length() -> usize {
    generator::DEFAULT_LENGTH
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            session_ttl_minutes: default_session_ttl_minutes(),
            generated_password_length: default_generated_password_length(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".locker.toml";

    const SIGNING_KEY_FILE: &'static str = "session.key";

    const TOKEN_FILE: &'static str = "session.token";

    /// Load settings from `<project_dir>/.locker.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed or holds unusable values,
    /// a configuration error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            LockerError::Configuration(format!(
                "Failed to parse {}: {e}",
                config_path.display()
            ))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the rest of the crate cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.argon2_params()
            .validate()
            .map_err(|e| LockerError::Configuration(e.to_string()))?;

        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&self.session_ttl_minutes) {
            return Err(LockerError::Configuration(format!(
                "session_ttl_minutes must be between 1 and {MAX_SESSION_TTL_MINUTES}"
            )));
        }

        if !(generator::MIN_LENGTH..=generator::MAX_LENGTH)
            .contains(&self.generated_password_length)
        {
            return Err(LockerError::Configuration(format!(
                "generated_password_length must be between {} and {}",
                generator::MIN_LENGTH,
                generator::MAX_LENGTH
            )));
        }

        if self.database_file.trim().is_empty() {
            return Err(LockerError::Configuration(
                "database_file cannot be empty".into(),
            ));
        }

        Ok(())
    }

    /// Resolve the data directory, preferring an explicit override.
    pub fn data_path(&self, project_dir: &Path, override_dir: Option<&str>) -> PathBuf {
        project_dir.join(override_dir.unwrap_or(&self.data_dir))
    }

    /// Example: `project_dir/.locker/locker.db`
    pub fn database_path(&self, data_path: &Path) -> PathBuf {
        data_path.join(&self.database_file)
    }

    pub fn signing_key_path(&self, data_path: &Path) -> PathBuf {
        data_path.join(Self::SIGNING_KEY_FILE)
    }

    pub fn token_path(&self, data_path: &Path) -> PathBuf {
        data_path.join(Self::TOKEN_FILE)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Session lifetime, clamped to the accepted range.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(
            self.session_ttl_minutes
                .clamp(1, MAX_SESSION_TTL_MINUTES),
        )
    }
}

// ── Tests ────────────────────────────────────────────────────────────
