//! `locker register`: create an account protected by a master password.

use crate::cli::output;
use crate::cli::{open_locker, prompt_new_master_password, Cli};
use crate::errors::Result;

/// Execute the `register` command.
pub fn execute(cli: &Cli, username: &str, email: &str) -> Result<()> {
    let locker = open_locker(cli)?;
    let password = prompt_new_master_password()?;

    let user = locker.accounts().register(username, email, &password)?;

    output::success(&format!(
        "Account '{}' registered ({})",
        user.username, user.email
    ));
    output::warning("The master password cannot be recovered. Forgetting it loses every stored password.");
    output::tip(&format!("Run `locker login {}` to start a session.", user.username));

    Ok(())
}
