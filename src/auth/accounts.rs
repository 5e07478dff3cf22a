//! Registration and login.
//!
//! `AccountService` ties the credential verifier, the user store and the
//! session gate together.  Login proves the master credential once and
//! returns a session token; it never returns key material.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::session::{Principal, SessionGate, SessionToken};
use super::user::{normalize_email, validate_master_password, validate_username, User};
use crate::crypto::{CredentialVerifier, KEY_LEN, SALT_LEN};
use crate::errors::{LockerError, Result};
use crate::store::UserStore;

/// What a successful login hands back.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: SessionToken,
    pub principal: Principal,
    pub email: String,
}

/// Account registration and login.
pub struct AccountService {
    users: Arc<dyn UserStore>,
    verifier: CredentialVerifier,
    gate: SessionGate,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, verifier: CredentialVerifier, gate: SessionGate) -> Self {
        Self {
            users,
            verifier,
            gate,
        }
    }

    /// Register a new user.
    ///
    /// Duplicate usernames or emails fail with `Conflict` and leave the
    /// store unchanged.
    pub fn register(&self, username: &str, email: &str, master_password: &str) -> Result<User> {
        let username = username.trim();
        validate_username(username)?;
        let email = normalize_email(email)?;
        validate_master_password(master_password)?;

        // Cheap pre-check so a taken name does not cost a KDF run.
        if self.users.find_user_by_username(username)?.is_some() {
            return Err(LockerError::Conflict("username is already taken".into()));
        }

        let enrollment = self.verifier.register(master_password.as_bytes())?;
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email,
            salt: enrollment.salt.clone(),
            verification_hash: enrollment.verification_hash.clone(),
            created_at: Utc::now(),
        };

        self.users.insert_user(&user)?;
        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Prove the master credential and issue a session token.
    ///
    /// Unknown usernames and wrong credentials are both `Unauthorized`.
    pub fn login(&self, username: &str, master_password: &str) -> Result<LoginOutcome> {
        if master_password.is_empty() {
            return Err(LockerError::Validation(
                "master password is required".into(),
            ));
        }

        let Some(user) = self.users.find_user_by_username(username.trim())? else {
            // Burn one derivation so unknown names cost the same time.
            let _ = self
                .verifier
                .verify(master_password.as_bytes(), &[0u8; SALT_LEN], &[0u8; KEY_LEN]);
            warn!("login failed");
            return Err(LockerError::Unauthorized);
        };

        let ok = self.verifier.verify(
            master_password.as_bytes(),
            &user.salt,
            &user.verification_hash,
        )?;
        if !ok {
            warn!(user_id = %user.id, "login failed");
            return Err(LockerError::Unauthorized);
        }

        let token = self.gate.issue(&user.id, &user.username)?;
        info!(user_id = %user.id, "login succeeded");

        Ok(LoginOutcome {
            principal: Principal {
                id: user.id,
                username: user.username,
                expires_at: token.expires_at(),
            },
            token,
            email: user.email,
        })
    }

    /// Resolve a bearer token to its principal.
    pub fn authenticate(&self, token: &str) -> Result<Principal> {
        self.gate.validate(token)
    }
}
