use reqwest::StatusCode;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// The request never produced a response (connection refused, DNS, TLS, ...)
    #[error("Network request failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status of a rejected operation, if the API answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AppError::Rejected { status, .. } => Some(*status),
            AppError::HttpClient(e) => e.status(),
            AppError::InvalidInput(_) | AppError::Internal(_) => None,
        }
    }

    /// True when the API rejected the request because there is no valid session
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

pub type AppResult<T> = Result<T, AppError>;
