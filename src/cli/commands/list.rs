//! `locker list`: display stored passwords in a table (no secrets).

use crate::cli::output;
use crate::cli::{open_locker, require_principal, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let locker = open_locker(cli)?;
    let principal = require_principal(cli, &locker)?;

    let records = locker.vault().list(&principal)?;

    output::info(&format!(
        "{}: {} stored password(s)",
        principal.username,
        records.len()
    ));
    output::print_records_table(&records);

    Ok(())
}
