//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{RecordSummary, RecordView};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of record metadata (Id, Site, Account, Notes, Created, Updated).
pub fn print_records_table(records: &[RecordSummary]) {
    if records.is_empty() {
        info("No passwords stored yet.");
        tip("Run `locker add --label <SITE> --account <NAME>` to add one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Site", "Account", "Notes", "Created", "Updated"]);

    for r in records {
        table.add_row(vec![
            r.id.clone(),
            r.label.clone(),
            r.account_name.clone(),
            r.notes.clone().unwrap_or_default(),
            r.created_at.format(TIME_FORMAT).to_string(),
            r.updated_at.format(TIME_FORMAT).to_string(),
        ]);
    }

    println!("{table}");
}

/// Print one decrypted record.  `show_secret` is false when the secret
/// went to the clipboard instead.
pub fn print_record(view: &RecordView, show_secret: bool) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let secret = if show_secret {
        view.secret.as_str().to_string()
    } else {
        "(copied to clipboard)".to_string()
    };

    table.add_row(vec!["Id".to_string(), view.id.clone()]);
    table.add_row(vec!["Site".to_string(), view.label.clone()]);
    table.add_row(vec!["Account".to_string(), view.account_name.clone()]);
    table.add_row(vec!["Password".to_string(), secret]);
    table.add_row(vec![
        "Notes".to_string(),
        view.notes.clone().unwrap_or_default(),
    ]);
    table.add_row(vec![
        "Created".to_string(),
        view.created_at.format(TIME_FORMAT).to_string(),
    ]);
    table.add_row(vec![
        "Updated".to_string(),
        view.updated_at.format(TIME_FORMAT).to_string(),
    ]);

    println!("{table}");
}
