//! Terminal output for session and profile data.

use anyhow::Result;
use colored::{ColoredString, Colorize};
use serde::Serialize;

use hearth::SessionStatus;
use hearth_core::UserProfile;

/// Print a success line.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error line to stderr.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print the fields of a user profile.
pub fn profile(user: &UserProfile) {
    field("Name", &user.full_name());
    field("Email", &user.email);
    field("ID", &user.id.to_string());
    if let Some(avatar) = &user.avatar_url {
        field("Avatar", avatar);
    }
}

/// Colored label for a session state.
pub fn status_label(status: SessionStatus) -> ColoredString {
    match status {
        SessionStatus::Authenticated => "authenticated".green(),
        SessionStatus::Authenticating => "authenticating".yellow(),
        SessionStatus::Unauthenticated => "unauthenticated".dimmed(),
        SessionStatus::Error => "error".red(),
    }
}

/// Print a value as pretty-printed JSON on stdout.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
