//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::context::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, config: &Config) -> Result<()> {
    let manager = config.restore().await?;
    let user = manager
        .snapshot()
        .user
        .context("Not logged in. Run 'hearth login' first.")?;

    if args.json {
        return output::json_pretty(&user);
    }

    output::profile(&user);
    output::field("API", config.api_url.as_str());

    Ok(())
}
