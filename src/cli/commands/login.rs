//! `locker login`: prove the master password and save a session token.

use crate::cli::output;
use crate::cli::{open_locker, prompt_master_password, save_token, Cli};
use crate::errors::Result;

/// Execute the `login` command.
pub fn execute(cli: &Cli, username: &str) -> Result<()> {
    let locker = open_locker(cli)?;
    let password = prompt_master_password()?;

    let outcome = locker.accounts().login(username, &password)?;
    save_token(&locker.token_path(), outcome.token.as_str())?;

    output::success(&format!(
        "Logged in as '{}'. Session valid until {}",
        outcome.principal.username,
        outcome.token.expires_at().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output::tip("Reading or changing a password still asks for your master password.");

    Ok(())
}
