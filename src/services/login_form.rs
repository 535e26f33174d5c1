use crate::{
    error::{AppError, AppResult},
    routes::HOME_PATH,
    services::session::SessionManager,
};

const FALLBACK_ERROR: &str = "Something went wrong";

/// Which of the two forms on the login page is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Login,
    Register,
}

/// Submission state of the login/register page
///
/// `submit` borrows the form mutably for the whole request, so one form has at
/// most one submission in flight. Dropping that future leaves the form usable.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub mode: FormMode,
    pub email: String,
    pub password: String,
    pub display_name: String,
    error: Option<String>,
}

impl LoginForm {
    pub fn new(mode: FormMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Switches between login and register; the inline error goes away
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            FormMode::Login => FormMode::Register,
            FormMode::Register => FormMode::Login,
        };
        self.error = None;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the submit button is enabled
    pub fn can_submit(&self) -> bool {
        !self.email.is_empty()
            && !self.password.is_empty()
            && (self.mode == FormMode::Login || !self.display_name.is_empty())
    }

    /// Submits the form through the session manager.
    ///
    /// Returns where to navigate on success. On failure the message is kept
    /// for display and the fields are left as typed.
    pub async fn submit(&mut self, sessions: &SessionManager) -> AppResult<&'static str> {
        if !self.can_submit() {
            return Err(AppError::InvalidInput(self.missing_field().to_string()));
        }

        self.error = None;

        let result = match self.mode {
            FormMode::Login => sessions.login(&self.email, &self.password).await,
            FormMode::Register => {
                sessions
                    .register(&self.email, &self.password, &self.display_name)
                    .await
            }
        };

        match result {
            Ok(_) => Ok(HOME_PATH),
            Err(e) => {
                let message = e.to_string();
                self.error = Some(if message.is_empty() {
                    FALLBACK_ERROR.to_string()
                } else {
                    message
                });
                Err(e)
            }
        }
    }

    fn missing_field(&self) -> &'static str {
        if self.mode == FormMode::Register && self.display_name.is_empty() {
            "Display name is required"
        } else if self.email.is_empty() {
            "Email is required"
        } else {
            "Password is required"
        }
    }
}
