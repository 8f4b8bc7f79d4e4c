//! Session state, the reducer that drives it, and the manager that owns it.

mod action;
mod manager;
mod state;

pub use action::{AuthAction, reduce};
pub use manager::{LOGIN_FAILED, SIGNUP_FAILED, SessionManager};
pub use state::{Session, SessionStatus};
