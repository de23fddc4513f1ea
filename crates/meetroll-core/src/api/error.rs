use thiserror::Error;

use crate::auth::AuthError;

/// Failure talking to the Meet REST API while listing or mutating resources.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired or missing a scope")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited by the Meet API")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Could not obtain an access token: {0}")]
    Auth(#[from] AuthError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl DirectoryError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => DirectoryError::Unauthorized,
            403 => DirectoryError::AccessDenied(truncated),
            404 => DirectoryError::NotFound(truncated),
            429 => DirectoryError::RateLimited,
            500..=599 => DirectoryError::ServerError(truncated),
            _ => DirectoryError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}
