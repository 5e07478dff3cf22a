//! `locker get`: decrypt and show a single stored password.

use crate::cli::output;
use crate::cli::{open_locker, prompt_master_password, require_principal, Cli};
use crate::errors::{LockerError, Result};

/// Execute the `get` command.
pub fn execute(cli: &Cli, id: &str, copy: bool) -> Result<()> {
    let locker = open_locker(cli)?;
    let principal = require_principal(cli, &locker)?;

    // Decryption always needs the master password, not just the session.
    let password = prompt_master_password()?;
    let view = locker.vault().read(&principal, id, &password)?;

    if copy {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| LockerError::CommandFailed(format!("clipboard unavailable: {e}")))?;
        clipboard
            .set_text(view.secret.as_str())
            .map_err(|e| LockerError::CommandFailed(format!("clipboard write failed: {e}")))?;
        output::print_record(&view, false);
        output::success("Password copied to clipboard.");
    } else {
        output::print_record(&view, true);
    }

    Ok(())
}
