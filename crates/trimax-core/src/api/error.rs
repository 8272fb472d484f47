use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required. Please log in.")]
    AuthenticationRequired,

    #[error("Authentication expired. Please log in again.")]
    AuthenticationExpired,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Marker the backend's unauthorized failures carry in their text
const UNAUTHORIZED_MARKER: &str = "401";

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
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

    /// Whether this failure means the backend rejected our credentials.
    ///
    /// Matches a 401 status, or backend error text mentioning 401.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            ApiError::AuthenticationExpired => true,
            ApiError::Http { status, message } => {
                *status == StatusCode::UNAUTHORIZED || message.contains(UNAUTHORIZED_MARKER)
            }
            // Transport errors embed the URL, so only trust their status.
            ApiError::Network(e) => e.status() == Some(StatusCode::UNAUTHORIZED),
            ApiError::GraphQl(message) => message.contains(UNAUTHORIZED_MARKER),
            ApiError::AuthenticationRequired
            | ApiError::InvalidResponse(_)
            | ApiError::InvalidHeader(_) => false,
        }
    }
}
