//! Status command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use hearth::{Session, SessionStatus};
use hearth_core::UserProfile;

use crate::context::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the session snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

/// Session snapshot plus the derived state, as printed by `--json`.
///
/// The bearer token itself is never printed, only whether one is held.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport<'a> {
    status: SessionStatus,
    is_authenticated: bool,
    user: Option<&'a UserProfile>,
    has_token: bool,
    loading: bool,
    error: Option<&'a str>,
}

impl<'a> From<&'a Session> for StatusReport<'a> {
    fn from(session: &'a Session) -> Self {
        Self {
            status: session.status(),
            is_authenticated: session.is_authenticated,
            user: session.user.as_ref(),
            has_token: session.token.is_some(),
            loading: session.loading,
            error: session.error.as_deref(),
        }
    }
}

pub async fn run(args: StatusArgs, config: &Config) -> Result<()> {
    let manager = config.restore().await?;
    let session = manager.snapshot();

    if args.json {
        return output::json_pretty(&StatusReport::from(&session));
    }

    output::field("Status", &output::status_label(session.status()).to_string());

    if let Some(user) = &session.user {
        output::field("User", &format!("{} <{}>", user.full_name(), user.email));
    }
    if let Some(error) = &session.error {
        output::field("Error", error);
    }
    output::field("Storage", &config.storage.display().to_string());

    Ok(())
}
