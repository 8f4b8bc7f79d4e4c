//! Session actions and the transition function.

use hearth_core::{AccessToken, UserProfile};

use super::state::Session;

/// An event that moves the session from one state to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    /// An attempt began. Clears any earlier error.
    Start,
    /// An attempt settled with a profile and a token.
    Success {
        user: UserProfile,
        token: AccessToken,
    },
    /// An attempt settled with a user-facing error message.
    Failure { message: String },
    /// Back to the initial signed-out shape.
    Reset,
    /// Drop the error message, nothing else.
    ClearError,
}

/// Fold `action` into `state`, producing the next session.
///
/// Pure: no I/O, and the result depends only on its inputs.
pub fn reduce(state: &Session, action: AuthAction) -> Session {
    match action {
        AuthAction::Start => Session {
            loading: true,
            error: None,
            ..state.clone()
        },
        AuthAction::Success { user, token } => Session {
            is_authenticated: true,
            user: Some(user),
            token: Some(token),
            loading: false,
            error: None,
        },
        AuthAction::Failure { message } => Session {
            is_authenticated: false,
            user: None,
            token: None,
            loading: false,
            error: Some(message),
        },
        AuthAction::Reset => Session::default(),
        AuthAction::ClearError => Session {
            error: None,
            ..state.clone()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStatus;

    fn user(id: i64) -> UserProfile {
        UserProfile {
            id,
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email: "good@x.com".to_string(),
            avatar_url: None,
        }
    }

    fn alphabet() -> Vec<AuthAction> {
        vec![
            AuthAction::Start,
            AuthAction::Success {
                user: user(1),
                token: AccessToken::new("T"),
            },
            AuthAction::Failure {
                message: "Login failed".to_string(),
            },
            AuthAction::Reset,
            AuthAction::ClearError,
        ]
    }

    fn holds_invariants(session: &Session) -> bool {
        let auth_ok = session.is_authenticated == (session.user.is_some() && session.token.is_some());
        let loading_ok = !(session.loading && session.error.is_some());
        auth_ok && loading_ok
    }

    /// Every action sequence of at most `max_len` actions.
    fn all_sequences(max_len: usize) -> Vec<Vec<AuthAction>> {
        let mut all = vec![Vec::new()];
        let mut frontier: Vec<Vec<AuthAction>> = vec![Vec::new()];
        for _ in 0..max_len {
            frontier = frontier
                .iter()
                .flat_map(|seq| {
                    alphabet().into_iter().map(move |action| {
                        let mut extended = seq.clone();
                        extended.push(action);
                        extended
                    })
                })
                .collect();
            all.extend(frontier.iter().cloned());
        }
        all
    }

    #[test]
    fn invariants_hold_after_every_transition() {
        for sequence in all_sequences(5) {
            let mut session = Session::default();
            for action in sequence.iter().cloned() {
                session = reduce(&session, action);
                assert!(
                    holds_invariants(&session),
                    "invariant broken after {:?}: {:?}",
                    sequence,
                    session
                );
            }
        }
    }

    #[test]
    fn clear_error_never_touches_auth_fields() {
        for sequence in all_sequences(4) {
            let mut session = Session::default();
            for action in sequence.iter().cloned() {
                session = reduce(&session, action);
            }

            let cleared = reduce(&session, AuthAction::ClearError);
            assert_eq!(cleared.is_authenticated, session.is_authenticated);
            assert_eq!(cleared.user, session.user);
            assert_eq!(cleared.token, session.token);
            assert_eq!(cleared.loading, session.loading);
            assert!(cleared.error.is_none());
        }
    }

    #[test]
    fn reset_from_any_state_is_initial() {
        for sequence in all_sequences(4) {
            let mut session = Session::default();
            for action in sequence.iter().cloned() {
                session = reduce(&session, action);
            }
            assert!(reduce(&session, AuthAction::Reset).is_initial());
        }
    }

    #[test]
    fn start_clears_stale_error() {
        let failed = reduce(
            &Session::default(),
            AuthAction::Failure {
                message: "Incorrect email or password".to_string(),
            },
        );
        assert_eq!(failed.status(), SessionStatus::Error);

        let retrying = reduce(&failed, AuthAction::Start);
        assert_eq!(retrying.status(), SessionStatus::Authenticating);
        assert!(retrying.error.is_none());
    }

    #[test]
    fn success_replaces_profile_wholesale() {
        let first = reduce(
            &Session::default(),
            AuthAction::Success {
                user: user(1),
                token: AccessToken::new("T1"),
            },
        );
        let second = reduce(
            &reduce(&first, AuthAction::Start),
            AuthAction::Success {
                user: user(2),
                token: AccessToken::new("T2"),
            },
        );

        assert_eq!(second.user.as_ref().map(|u| u.id), Some(2));
        assert_eq!(second.token, Some(AccessToken::new("T2")));
        assert_eq!(second.status(), SessionStatus::Authenticated);
    }

    #[test]
    fn failure_drops_previous_user() {
        let authed = reduce(
            &Session::default(),
            AuthAction::Success {
                user: user(1),
                token: AccessToken::new("T"),
            },
        );
        let failed = reduce(
            &reduce(&authed, AuthAction::Start),
            AuthAction::Failure {
                message: "Login failed".to_string(),
            },
        );

        assert!(!failed.is_authenticated);
        assert!(failed.user.is_none());
        assert!(failed.token.is_none());
        assert_eq!(failed.error.as_deref(), Some("Login failed"));
    }
}
