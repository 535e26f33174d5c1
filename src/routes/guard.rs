use crate::models::{Session, SessionStatus};

use super::LOGIN_PATH;

/// What a protected page should do for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Identity check still pending: show neither the page nor a redirect
    Defer,
    /// Signed in: show the page
    Allow,
    /// Anonymous: replace the current history entry with `to`
    Redirect { to: &'static str },
}

/// Decides access to a protected page from the session as it is right now.
///
/// Holds no state of its own; callers evaluate it again on every navigation
/// and on every session change.
pub fn require_auth(session: &Session) -> GuardDecision {
    match (session.status(), session.user()) {
        (SessionStatus::Initializing, _) => GuardDecision::Defer,
        (SessionStatus::Resolved, Some(_)) => GuardDecision::Allow,
        (SessionStatus::Resolved, None) => GuardDecision::Redirect { to: LOGIN_PATH },
    }
}
