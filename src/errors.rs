use thiserror::Error;

/// All errors that can occur in Locker.
///
/// The first five variants are the user-facing taxonomy. Everything
/// else is internal and must be mapped (or reported generically) before
/// it reaches a caller outside the crate.
#[derive(Debug, Error)]
pub enum LockerError {
    // --- User-facing taxonomy ---
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Record not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Session key errors ---
    #[error("Session key error: {0}")]
    SessionKey(String),

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl LockerError {
    /// Returns `true` if the error belongs to the user-facing taxonomy and
    /// its message can be shown as-is.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Unauthorized
                | Self::NotFound
                | Self::Conflict(_)
                | Self::Configuration(_)
                | Self::CommandFailed(_)
        )
    }
}

impl From<rusqlite::Error> for LockerError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Convenience type alias for Locker results.
pub type Result<T> = std::result::Result<T, LockerError>;
