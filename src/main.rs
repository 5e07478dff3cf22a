use clap::Parser;
use locker::cli::commands::update::UpdateArgs;
use locker::cli::{Cli, Commands};
use locker::errors::LockerError;

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Register {
            ref username,
            ref email,
        } => locker::cli::commands::register::execute(&cli, username, email),
        Commands::Login { ref username } => locker::cli::commands::login::execute(&cli, username),
        Commands::Logout => locker::cli::commands::logout::execute(&cli),
        Commands::Add {
            ref label,
            ref account,
            ref notes,
            generate,
            ref secret,
        } => locker::cli::commands::add::execute(
            &cli,
            label,
            account,
            notes.as_deref(),
            generate,
            secret.as_deref(),
        ),
        Commands::Get { ref id, copy } => locker::cli::commands::get::execute(&cli, id, copy),
        Commands::Update {
            ref id,
            ref label,
            ref account,
            ref notes,
            generate,
            ref secret,
        } => locker::cli::commands::update::execute(
            &cli,
            &UpdateArgs {
                id,
                label: label.as_deref(),
                account: account.as_deref(),
                notes: notes.as_deref(),
                generate,
                secret: secret.as_deref(),
            },
        ),
        Commands::Delete { ref id, force } => {
            locker::cli::commands::delete::execute(&cli, id, force)
        }
        Commands::List => locker::cli::commands::list::execute(&cli),
        Commands::Search { ref query } => locker::cli::commands::search::execute(&cli, query),
        Commands::Generate { length } => locker::cli::commands::generate::execute(&cli, length),
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }
}

/// Show taxonomy errors as-is; log the detail of anything internal and
/// print a generic line instead.
fn report(e: &LockerError) {
    if e.is_user_facing() {
        locker::cli::output::error(&e.to_string());
    } else {
        tracing::error!(error = %e, "command failed");
        locker::cli::output::error("Internal error. Rerun with LOCKER_LOG=debug for details");
    }
}

/// Logs go to stderr; `LOCKER_LOG` takes an `EnvFilter` directive.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_env("LOCKER_LOG").unwrap_or_else(|_| EnvFilter::new("locker=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
