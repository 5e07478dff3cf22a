//! The `User` account record and registration input checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{LockerError, Result};
use crate::vault::record::{base64_decode, base64_encode};

/// Minimum master credential length.
const MIN_PASSWORD_LEN: usize = 8;

/// A registered user.  Salt and verification hash never change after
/// registration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub verification_hash: Vec<u8>,

    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("verification_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Usernames: 3 to 64 ASCII letters, digits, underscores, hyphens, periods.
pub fn validate_username(name: &str) -> Result<()> {
    if name.len() < 3 || name.len() > 64 {
        return Err(LockerError::Validation(
            "username must be between 3 and 64 characters".into(),
        ));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
    {
        return Err(LockerError::Validation(format!(
            "username '{name}' contains invalid characters; only ASCII letters, digits, underscores, hyphens, and periods are allowed"
        )));
    }
    Ok(())
}

/// Trim and lowercase an email, then check its basic shape.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let invalid = || LockerError::Validation(format!("'{email}' is not a valid email address"));

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }
    Ok(email)
}

/// Master credential policy for new accounts: at least 8 characters with
/// upper case, lower case, a digit and a symbol.
pub fn validate_master_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(LockerError::Validation(format!(
            "master password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let checks = [
        (
            password.chars().any(|c| c.is_ascii_uppercase()),
            "an uppercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_lowercase()),
            "a lowercase letter",
        ),
        (password.chars().any(|c| c.is_ascii_digit()), "a digit"),
        (
            password.chars().any(|c| !c.is_ascii_alphanumeric()),
            "a symbol",
        ),
    ];
    if let Some((_, missing)) = checks.iter().find(|(ok, _)| !ok) {
        return Err(LockerError::Validation(format!(
            "master password must contain {missing}"
        )));
    }
    Ok(())
}
