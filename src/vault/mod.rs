//! Vault module: sealed password records.
//!
//! This module provides:
//! - Record, summary and view types (`record`)
//! - The record lifecycle manager (`manager`)
//! - A random password generator (`generator`)

pub mod generator;
pub mod manager;
pub mod record;

// Re-export the most commonly used items.
pub use generator::generate_password;
pub use manager::VaultManager;
pub use record::{RecordMetadata, RecordSummary, RecordView, SealedUpdate, VaultRecord};
