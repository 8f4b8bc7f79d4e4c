//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::context::Config;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(args: LoginArgs, config: &Config) -> Result<()> {
    let manager = config.manager()?;

    eprintln!("{}", "Logging in...".dimmed());

    let session = manager
        .login(&args.email, &args.password)
        .await
        .context("Failed to login")?;

    super::report_attempt(&session, "Logged in")
}
