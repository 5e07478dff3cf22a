//! `locker logout`: forget the saved session token.

use crate::cli::output;
use crate::cli::{open_locker, Cli};
use crate::errors::Result;

/// Execute the `logout` command.
///
/// Tokens are stateless, so this only removes the local copy.
pub fn execute(cli: &Cli) -> Result<()> {
    let locker = open_locker(cli)?;
    let path = locker.token_path();

    if path.exists() {
        std::fs::remove_file(&path)?;
        output::success("Logged out.");
    } else {
        output::info("No saved session.");
    }

    Ok(())
}
