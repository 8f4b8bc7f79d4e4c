//! Signup command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use hearth_core::SignupRequest;

use crate::context::Config;

#[derive(Args, Debug)]
pub struct SignupArgs {
    /// First name
    #[arg(long)]
    pub first_name: String,

    /// Last name
    #[arg(long)]
    pub last_name: String,

    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(args: SignupArgs, config: &Config) -> Result<()> {
    let manager = config.manager()?;

    eprintln!("{}", "Creating account...".dimmed());

    let request = SignupRequest::new(args.first_name, args.last_name, args.email, args.password);
    let session = manager.signup(request).await.context("Failed to sign up")?;

    super::report_attempt(&session, "Signed up")
}
