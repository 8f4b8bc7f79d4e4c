//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use hearth_core::DEFAULT_API_URL;

use crate::commands::{login, logout, signup, status, whoami};

/// Sign in to the family-task API and inspect the session.
#[derive(Parser, Debug)]
#[command(name = "hearth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Identity API base URL
    #[arg(long, env = "HEARTH_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Token storage file [default: <data dir>/hearth/storage.json]
    #[arg(long, env = "HEARTH_STORAGE", global = true)]
    pub storage: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with email and password
    Login(login::LoginArgs),

    /// Create an account and sign in
    Signup(signup::SignupArgs),

    /// Sign out and forget the stored token
    Logout(logout::LogoutArgs),

    /// Show the signed-in user
    Whoami(whoami::WhoamiArgs),

    /// Show the session state
    Status(status::StatusArgs),
}
