//! Identity API endpoint paths and request/response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// POST, exchanges email and password for a bearer token.
pub const LOGIN: &str = "/auth/login";

/// POST, creates an account.
pub const SIGNUP: &str = "/auth/signup";

/// GET, returns the profile behind the bearer token.
pub const ME: &str = "/auth/me";

/// Request body for login.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from login.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Request body for signup.
#[derive(Debug, Serialize)]
pub struct SignupBody<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Error body returned by the identity API.
///
/// `detail` is a plain message for most failures and a list of field
/// errors (each with a `msg`) when request validation fails.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorResponse {
    /// Returns the human-readable message carried by `detail`, if any.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => items
                .iter()
                .find_map(|item| item.get("msg").and_then(Value::as_str))
                .map(str::to_string),
            Value::Object(obj) => obj.get("msg").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }
}
