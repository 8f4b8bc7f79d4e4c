//! Subcommand implementations.

pub mod login;
pub mod logout;
pub mod signup;
pub mod status;
pub mod whoami;

use anyhow::{Result, bail};

use hearth::Session;

use crate::cli::{Cli, Commands};
use crate::context::Config;
use crate::output;

pub async fn handle(cli: Cli) -> Result<()> {
    let config = Config::from_cli(&cli)?;

    match cli.command {
        Commands::Login(args) => login::run(args, &config).await,
        Commands::Signup(args) => signup::run(args, &config).await,
        Commands::Logout(args) => logout::run(args, &config),
        Commands::Whoami(args) => whoami::run(args, &config).await,
        Commands::Status(args) => status::run(args, &config).await,
    }
}

/// Report a settled login or signup attempt.
fn report_attempt(session: &Session, verb: &str) -> Result<()> {
    if let Some(message) = &session.error {
        output::error(message);
        bail!("{} failed", verb);
    }

    let Some(user) = &session.user else {
        bail!("{} did not produce a session", verb);
    };

    output::success(&format!("{} as {}", verb, user.email));
    println!();
    output::profile(user);
    Ok(())
}
