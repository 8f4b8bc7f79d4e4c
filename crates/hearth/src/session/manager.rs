//! The session state machine driving login, signup, logout and revalidation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use hearth_core::error::Error;
use hearth_core::{AccessToken, IdentityApi, LoginCredentials, Result, SignupRequest, UserProfile};

use super::action::{AuthAction, reduce};
use super::state::{Session, SessionStatus};
use crate::auth::CredentialStore;

/// Shown when a failed login carries no server message.
pub const LOGIN_FAILED: &str = "Login failed";

/// Shown when a failed signup carries no server message.
pub const SIGNUP_FAILED: &str = "Signup failed";

/// Which attempt, if any, currently owns the session.
#[derive(Debug, Default)]
struct Gate {
    generation: u64,
    in_flight: bool,
}

/// Ownership of the session for one attempt. Releases the gate on drop
/// unless a logout already took it away.
struct Attempt<'a> {
    gate: &'a Mutex<Gate>,
    generation: u64,
}

impl Attempt<'_> {
    /// Lock the gate if this attempt still owns the session.
    fn owned(&self) -> Option<MutexGuard<'_, Gate>> {
        let gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        (gate.generation == self.generation).then_some(gate)
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if let Some(mut gate) = self.owned() {
            gate.in_flight = false;
        }
    }
}

/// Owns the authoritative [`Session`] and applies user intents to it.
///
/// Only one attempt (login, signup or revalidation) runs at a time. An
/// intent issued while another attempt is in flight is rejected with
/// [`Error::AttemptInFlight`] and leaves the session untouched.
///
/// [`SessionManager::logout`] supersedes an attempt in flight: its network
/// calls still run to completion, but their outcome is dropped and no
/// token it obtains is persisted. Otherwise attempts are never cancelled,
/// and an attempt settles even if nobody is waiting for it.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use hearth::{CredentialStore, SessionManager};
/// use hearth_core::{ApiUrl, MemoryTokenStorage};
/// use hearth_http::HttpIdentityApi;
///
/// # async fn example() -> Result<(), hearth_core::Error> {
/// let store = Arc::new(CredentialStore::new(Arc::new(MemoryTokenStorage::new())));
/// let api = HttpIdentityApi::new(ApiUrl::default(), store.clone())?;
/// let manager = SessionManager::start(api, store).await;
///
/// let session = manager.login("ada@example.com", "hunter22").await?;
/// if let Some(error) = session.error {
///     eprintln!("{}", error);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SessionManager<A> {
    api: A,
    credentials: Arc<CredentialStore>,
    state: watch::Sender<Session>,
    gate: Mutex<Gate>,
}

impl<A: IdentityApi> SessionManager<A> {
    /// Create a manager in the initial, signed-out state.
    ///
    /// `api` should authenticate its requests through `credentials`.
    pub fn new(api: A, credentials: Arc<CredentialStore>) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            api,
            credentials,
            state,
            gate: Mutex::new(Gate::default()),
        }
    }

    /// Create a manager and run startup revalidation of any persisted token.
    pub async fn start(api: A, credentials: Arc<CredentialStore>) -> Self {
        let manager = Self::new(api, credentials);
        if let Err(e) = manager.revalidate().await {
            warn!(error = %e, "Startup revalidation did not run");
        }
        manager
    }

    /// Returns a copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Returns the current state-machine state.
    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    /// Returns true while an attempt is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Subscribe to session changes. The receiver sees every settled
    /// transition.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Returns the credential store backing this session.
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Sign in with email and password.
    ///
    /// Returns the settled session; a rejected login is reported in its
    /// `error` field, not as an `Err`.
    ///
    /// # Errors
    ///
    /// [`Error::AttemptInFlight`] if another attempt is still running.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let attempt = self.begin()?;
        info!("Logging in");

        let credentials = LoginCredentials::new(email, password);
        let outcome = self.authenticate(&attempt, &credentials).await;
        self.settle(&attempt, outcome, LOGIN_FAILED);

        Ok(self.snapshot())
    }

    /// Create an account, then sign in with the same credentials.
    ///
    /// A failure in either step is reported as a signup failure.
    ///
    /// # Errors
    ///
    /// [`Error::AttemptInFlight`] if another attempt is still running.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: SignupRequest) -> Result<Session> {
        let attempt = self.begin()?;
        info!("Signing up");

        let outcome = match self.api.signup(&request).await {
            Ok(created) => {
                debug!(user_id = created.id, "Account created, logging in");
                self.authenticate(&attempt, &request.credentials()).await
            }
            Err(e) => Err(e),
        };
        self.settle(&attempt, outcome, SIGNUP_FAILED);

        Ok(self.snapshot())
    }

    /// Sign out: forget the token and return to the initial session.
    ///
    /// Allowed in any state. An attempt in flight is superseded: the
    /// session is free for a new intent at once, and the old attempt's
    /// outcome is discarded when it settles.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Session {
        info!("Logging out");
        {
            let mut gate = self.lock_gate();
            if gate.in_flight {
                debug!("Superseding attempt in flight");
            }
            gate.generation += 1;
            gate.in_flight = false;
            self.discard_token();
            self.dispatch(AuthAction::Reset);
        }
        self.snapshot()
    }

    /// Check a persisted token against the identity API.
    ///
    /// Meant for process start. With no persisted token this does nothing.
    /// A rejected token is removed and the session reset, without setting
    /// an error.
    ///
    /// # Errors
    ///
    /// [`Error::AttemptInFlight`] if another attempt is still running.
    #[instrument(skip(self))]
    pub async fn revalidate(&self) -> Result<Session> {
        let attempt = self.try_attempt()?;

        let Some(token) = self.credentials.initialize() else {
            debug!("No persisted token, nothing to revalidate");
            return Ok(self.snapshot());
        };

        info!("Revalidating persisted token");
        self.dispatch(AuthAction::Start);

        let result = self.api.me().await;
        let Some(_owned) = attempt.owned() else {
            debug!("Revalidation superseded by logout, dropping result");
            return Ok(self.snapshot());
        };
        match result {
            Ok(user) => self.dispatch(AuthAction::Success { user, token }),
            Err(e) => {
                info!(error = %e, "Persisted token rejected, signing out");
                self.discard_token();
                self.dispatch(AuthAction::Reset);
            }
        }

        Ok(self.snapshot())
    }

    /// Drop the error message. Nothing else changes.
    pub fn clear_error(&self) {
        if self.state.borrow().error.is_some() {
            self.dispatch(AuthAction::ClearError);
        }
    }

    /// Log in, store the token, and fetch the profile it belongs to.
    ///
    /// Returns `Ok(None)` if a logout superseded the attempt before the
    /// token could be stored.
    async fn authenticate(
        &self,
        attempt: &Attempt<'_>,
        credentials: &LoginCredentials,
    ) -> Result<Option<(UserProfile, AccessToken)>> {
        let grant = self.api.login(credentials).await?;
        {
            let Some(_owned) = attempt.owned() else {
                return Ok(None);
            };
            self.credentials.set_token(&grant.access_token)?;
        }
        let user = self.api.me().await?;
        Ok(Some((user, grant.access_token)))
    }

    /// Apply the outcome of a login or signup attempt, unless a logout
    /// superseded it.
    fn settle(
        &self,
        attempt: &Attempt<'_>,
        outcome: Result<Option<(UserProfile, AccessToken)>>,
        fallback: &str,
    ) {
        let Some(_owned) = attempt.owned() else {
            debug!("Attempt superseded by logout, dropping outcome");
            return;
        };
        match outcome {
            Ok(Some((user, token))) => {
                info!(user_id = user.id, "Authenticated");
                self.dispatch(AuthAction::Success { user, token });
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Authentication failed");
                // The durable token must never outlive the session that owns it.
                self.discard_token();
                self.dispatch(AuthAction::Failure {
                    message: e.user_message(fallback),
                });
            }
        }
    }

    fn lock_gate(&self) -> MutexGuard<'_, Gate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_attempt(&self) -> Result<Attempt<'_>> {
        let mut gate = self.lock_gate();
        if gate.in_flight {
            debug!("Rejecting intent, attempt already in flight");
            return Err(Error::AttemptInFlight);
        }
        gate.generation += 1;
        gate.in_flight = true;
        Ok(Attempt {
            gate: &self.gate,
            generation: gate.generation,
        })
    }

    fn begin(&self) -> Result<Attempt<'_>> {
        let attempt = self.try_attempt()?;
        self.dispatch(AuthAction::Start);
        Ok(attempt)
    }

    fn discard_token(&self) {
        if let Err(e) = self.credentials.clear_token() {
            warn!(error = %e, "Failed to remove persisted token");
        }
    }

    fn dispatch(&self, action: AuthAction) {
        self.state.send_modify(|session| {
            let next = reduce(session, action);
            debug!(from = ?session.status(), to = ?next.status(), "Session transition");
            *session = next;
        });
    }
}

impl<A> std::fmt::Debug for SessionManager<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session", &*self.state.borrow())
            .finish()
    }
}
