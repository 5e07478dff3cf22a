//! `locker add`: seal and store a new password.

use crate::cli::output;
use crate::cli::{open_locker, prompt_master_password, read_secret_value, require_principal, Cli};
use crate::errors::Result;
use crate::vault::RecordMetadata;

/// Execute the `add` command.
pub fn execute(
    cli: &Cli,
    label: &str,
    account: &str,
    notes: Option<&str>,
    generate: bool,
    secret: Option<&str>,
) -> Result<()> {
    let locker = open_locker(cli)?;
    let principal = require_principal(cli, &locker)?;

    let value = read_secret_value(&locker, secret, generate)?;
    let metadata = RecordMetadata::new(label, account, notes);
    metadata.validate()?;

    let password = prompt_master_password()?;
    let summary = locker
        .vault()
        .create(&principal, &value, metadata, &password)?;

    output::success(&format!(
        "Stored password for '{}' on {} (id {})",
        summary.account_name, summary.label, summary.id
    ));
    if generate {
        output::tip(&format!("Run `locker get {}` to see the generated password.", summary.id));
    }

    Ok(())
}
