//! The session record exposed to the UI.

use serde::{Serialize, Serializer};

use hearth_core::{AccessToken, UserProfile};

/// Coarse state of the session machine, derived from a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No user is signed in. Initial state.
    Unauthenticated,
    /// A login, signup or revalidation attempt is in flight.
    Authenticating,
    /// A user profile and token are held.
    Authenticated,
    /// The last attempt failed; `error` holds the message.
    Error,
}

/// Snapshot of the authentication session.
///
/// `is_authenticated` is true exactly when both `user` and `token` are
/// present. `loading` and `error` are never both set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub is_authenticated: bool,
    pub user: Option<UserProfile>,
    #[serde(serialize_with = "serialize_token")]
    pub token: Option<AccessToken>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Session {
    /// Returns the state-machine state this record represents.
    pub fn status(&self) -> SessionStatus {
        if self.loading {
            SessionStatus::Authenticating
        } else if self.error.is_some() {
            SessionStatus::Error
        } else if self.is_authenticated {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Unauthenticated
        }
    }

    /// Returns true if the record is in its initial, signed-out shape.
    pub fn is_initial(&self) -> bool {
        *self == Session::default()
    }
}

fn serialize_token<S: Serializer>(
    token: &Option<AccessToken>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match token {
        Some(token) => serializer.serialize_some(token.as_str()),
        None => serializer.serialize_none(),
    }
}
