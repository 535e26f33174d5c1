use serde::Serialize;

use super::User;

/// Resolution status of the session
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// The first identity check has not come back yet
    #[default]
    Initializing,
    /// The first identity check has come back; never regresses
    Resolved,
}

/// Client-side record of the current identity
///
/// Fields are private: consumers read a `Session` through its getters and only
/// the session manager in `services::session` can change it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct Session {
    user: Option<User>,
    status: SessionStatus,
    last_error: Option<String>,
}

impl Session {
    /// Creates the startup session: initializing, anonymous, no error
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_resolved(&self) -> bool {
        self.status == SessionStatus::Resolved
    }

    pub(crate) fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    pub(crate) fn set_error(&mut self, message: Option<String>) {
        self.last_error = message;
    }

    pub(crate) fn resolve(&mut self) {
        self.status = SessionStatus::Resolved;
    }
}
