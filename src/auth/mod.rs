//! Accounts and sessions.
//!
//! This module provides:
//! - The `User` record and registration checks (`user`)
//! - The session signing key file (`signing_key`)
//! - Signed, stateless session tokens (`session`)
//! - Registration and login (`accounts`)

pub mod accounts;
pub mod session;
pub mod signing_key;
pub mod user;

pub use accounts::{AccountService, LoginOutcome};
pub use session::{Principal, SessionGate, SessionToken};
pub use signing_key::SigningKey;
pub use user::User;
