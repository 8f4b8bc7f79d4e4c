//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use crate::context::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub fn run(_args: LogoutArgs, config: &Config) -> Result<()> {
    let manager = config.manager()?;
    manager.logout();

    output::success("Logged out");
    Ok(())
}
