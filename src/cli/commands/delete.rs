//! `locker delete`: remove a stored password.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_locker, require_principal, Cli};
use crate::errors::{LockerError, Result};

/// Execute the `delete` command.
///
/// Deletion checks ownership through the session only; it does not ask
/// for the master password.
pub fn execute(cli: &Cli, id: &str, force: bool) -> Result<()> {
    let locker = open_locker(cli)?;
    let principal = require_principal(cli, &locker)?;
    let summary = locker.vault().summary(&principal, id)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete password for '{}' on {}?",
                summary.account_name, summary.label
            ))
            .default(false)
            .interact()
            .map_err(|e| LockerError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    locker.vault().delete(&principal, id)?;
    output::success(&format!("Deleted password for {}", summary.label));

    Ok(())
}
