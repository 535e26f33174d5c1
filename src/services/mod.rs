pub mod login_form;
pub mod session;

pub use login_form::{FormMode, LoginForm};
pub use session::SessionManager;
