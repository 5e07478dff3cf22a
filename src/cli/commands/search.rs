//! `locker search`: find stored passwords by site.

use crate::cli::output;
use crate::cli::{open_locker, require_principal, Cli};
use crate::errors::Result;

/// Execute the `search` command.
pub fn execute(cli: &Cli, query: &str) -> Result<()> {
    let locker = open_locker(cli)?;
    let principal = require_principal(cli, &locker)?;

    let records = locker.vault().search(&principal, query)?;
    if records.is_empty() {
        output::info(&format!("No stored passwords match '{query}'."));
        return Ok(());
    }

    output::print_records_table(&records);
    Ok(())
}
