//! `locker generate`: print a random password.

use crate::cli::Cli;
use crate::config::Settings;
use crate::errors::Result;
use crate::vault::generate_password;

/// Execute the `generate` command.  Needs no account or session.
pub fn execute(_cli: &Cli, length: Option<usize>) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let length = match length {
        Some(n) => n,
        None => Settings::load(&cwd)?.generated_password_length,
    };

    let password = generate_password(length)?;
    println!("{}", password.as_str());

    Ok(())
}
