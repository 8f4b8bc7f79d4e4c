//! Validated value types.

mod api_url;
mod user;

pub use api_url::{ApiUrl, DEFAULT_API_URL};
pub use user::UserProfile;
