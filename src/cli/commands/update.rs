//! `locker update`: re-seal a stored password under a fresh nonce.

use crate::cli::output;
use crate::cli::{open_locker, prompt_master_password, read_secret_value, require_principal, Cli};
use crate::errors::Result;
use crate::vault::RecordMetadata;

/// Changes requested on the command line.  Missing fields keep their
/// current values; the secret is always replaced.
pub struct UpdateArgs<'a> {
    pub id: &'a str,
    pub label: Option<&'a str>,
    pub account: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub generate: bool,
    pub secret: Option<&'a str>,
}

/// Execute the `update` command.
pub fn execute(cli: &Cli, args: &UpdateArgs<'_>) -> Result<()> {
    let locker = open_locker(cli)?;
    let principal = require_principal(cli, &locker)?;

    let current = locker.vault().summary(&principal, args.id)?;
    let metadata = RecordMetadata::new(
        args.label.unwrap_or(&current.label),
        args.account.unwrap_or(&current.account_name),
        args.notes.or(current.notes.as_deref()),
    );
    metadata.validate()?;

    let value = read_secret_value(&locker, args.secret, args.generate)?;
    let password = prompt_master_password()?;
    let summary = locker
        .vault()
        .update(&principal, args.id, &value, metadata, &password)?;

    output::success(&format!(
        "Updated password for '{}' on {}",
        summary.account_name, summary.label
    ));

    Ok(())
}
