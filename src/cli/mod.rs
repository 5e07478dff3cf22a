//! CLI module: argument parser, output helpers and one module per command.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::Path;

use clap::Parser;
use zeroize::Zeroizing;

use crate::app::Locker;
use crate::auth::Principal;
use crate::errors::{LockerError, Result};

/// Environment variable read before prompting for the master password.
pub const MASTER_PASSWORD_ENV: &str = "LOCKER_MASTER_PASSWORD";

/// Locker CLI: per-user encrypted password locker.
#[derive(Parser)]
#[command(name = "locker", about = "Encrypted per-user password locker", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (default: .locker, or `data_dir` in .locker.toml)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Session token (default: the token saved by `locker login`)
    #[arg(long, env = "LOCKER_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new account with a master password
    Register {
        /// Unique username
        username: String,
        /// Unique email address
        email: String,
    },

    /// Prove the master password and start a session
    Login {
        /// Username to log in as
        username: String,
    },

    /// Forget the saved session token
    Logout,

    /// Store a new password
    Add {
        /// Site or service (e.g. example.com)
        #[arg(short, long)]
        label: String,
        /// Account name at that site
        #[arg(short, long)]
        account: String,
        /// Free-form notes (stored unencrypted)
        #[arg(short, long)]
        notes: Option<String>,
        /// Generate a random password instead of entering one
        #[arg(short, long)]
        generate: bool,
        /// Password value (omit for interactive prompt)
        secret: Option<String>,
    },

    /// Decrypt and show a stored password
    Get {
        /// Record id
        id: String,
        /// Copy the password to the clipboard instead of printing it
        #[arg(short, long)]
        copy: bool,
    },

    /// Replace a stored password (and optionally its details)
    Update {
        /// Record id
        id: String,
        /// New site or service
        #[arg(short, long)]
        label: Option<String>,
        /// New account name
        #[arg(short, long)]
        account: Option<String>,
        /// New notes (pass "" to clear them)
        #[arg(short, long)]
        notes: Option<String>,
        /// Generate a random password instead of entering one
        #[arg(short, long)]
        generate: bool,
        /// New password value (omit for interactive prompt)
        secret: Option<String>,
    },

    /// Delete a stored password
    Delete {
        /// Record id
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List stored passwords (no secrets shown)
    List,

    /// Search stored passwords by site (case-insensitive)
    Search {
        /// Text to look for in the site label
        query: String,
    },

    /// Print a random password
    Generate {
        /// Number of characters (default: from config, 16)
        #[arg(short, long)]
        length: Option<usize>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Open the locker rooted at the current directory.
pub fn open_locker(cli: &Cli) -> Result<Locker> {
    let cwd = std::env::current_dir()?;
    Locker::open(&cwd, cli.data_dir.as_deref())
}

/// Get the master password, trying in order:
/// 1. `LOCKER_MASTER_PASSWORD` env var (scripts/CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_master_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(MASTER_PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| LockerError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation (used by `register`).
///
/// Also respects `LOCKER_MASTER_PASSWORD` for scripted usage.  Strength
/// rules are enforced by the account service.
pub fn prompt_new_master_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(MASTER_PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let password = dialoguer::Password::new()
        .with_prompt("Choose master password")
        .with_confirmation(
            "Confirm master password",
            "Passwords do not match, try again",
        )
        .interact()
        .map_err(|e| LockerError::CommandFailed(format!("password prompt: {e}")))?;

    Ok(Zeroizing::new(password))
}

/// Resolve the secret value for `add`/`update` from one of four sources:
/// the generator, an inline argument, piped stdin, or a hidden prompt.
pub fn read_secret_value(
    locker: &Locker,
    inline: Option<&str>,
    generate: bool,
) -> Result<Zeroizing<String>> {
    if generate {
        if inline.is_some() {
            return Err(LockerError::Validation(
                "pass either a password value or --generate, not both".into(),
            ));
        }
        return crate::vault::generate_password(locker.settings().generated_password_length);
    }

    if let Some(v) = inline {
        output::warning("Password provided on command line; it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim_end_matches(['\r', '\n']).to_string();
        return Ok(Zeroizing::new(trimmed));
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter password to store")
        .interact()
        .map_err(|e| LockerError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Validate the session token and return the principal it names.
///
/// The token comes from `--token` / `LOCKER_TOKEN`, else from the file
/// written by `locker login`.
pub fn require_principal(cli: &Cli, locker: &Locker) -> Result<Principal> {
    let token = match &cli.token {
        Some(t) if !t.trim().is_empty() => Zeroizing::new(t.clone()),
        _ => load_saved_token(&locker.token_path())?.ok_or_else(|| {
            output::tip("Run `locker login <USERNAME>` to start a session.");
            LockerError::Unauthorized
        })?,
    };
    locker.authenticate(&token)
}

/// Write the session token with owner-only permissions.
pub fn save_token(path: &Path, token: &str) -> Result<()> {
    std::fs::write(path, token)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }

    Ok(())
}

/// Read a saved session token, if there is one.
pub fn load_saved_token(path: &Path) -> Result<Option<Zeroizing<String>>> {
    if !path.exists() {
        return Ok(None);
    }
    let token = Zeroizing::new(std::fs::read_to_string(path)?);
    if token.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(Zeroizing::new(token.trim().to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn token_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.token");

        assert!(load_saved_token(&path).unwrap().is_none());
        save_token(&path, "abc.def\n").unwrap();
        assert_eq!(load_saved_token(&path).unwrap().unwrap().as_str(), "abc.def");
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.token");
        save_token(&path, "abc.def").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn parses_add_with_flags() {
        let cli = Cli::parse_from([
            "locker",
            "add",
            "--label",
            "example.com",
            "--account",
            "alice_ex",
            "--generate",
        ]);
        match cli.command {
            Commands::Add {
                label,
                account,
                generate,
                secret,
                ..
            } => {
                assert_eq!(label, "example.com");
                assert_eq!(account, "alice_ex");
                assert!(generate);
                assert!(secret.is_none());
            }
            _ => panic!("expected add"),
        }
    }
}
