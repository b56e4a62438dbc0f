use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("External API error: HTTP {status}: {body}")]
    ExternalApiError { status: u16, body: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// Builds the error for a non-2xx response.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        AppError::ExternalApiError {
            status: status.as_u16(),
            body,
        }
    }

    /// Whether a failed list call may be attempted again.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Timeout(_) => true,
            AppError::ExternalApiError { status, .. } => *status == 429 || *status >= 500,
            AppError::ReqwestError(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// HTTP status and response body, when the failure came from the API.
    pub fn response_details(&self) -> Option<(u16, &str)> {
        match self {
            AppError::ExternalApiError { status, body } => Some((*status, body.as_str())),
            AppError::ReqwestError(e) => e.status().map(|s| (s.as_u16(), "")),
            _ => None,
        }
    }
}
