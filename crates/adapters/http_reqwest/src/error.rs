//! HTTP-specific error type wrapping reqwest errors.

use relaydash_domain::error::DashError;

/// Errors originating from the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The client could not be constructed.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// The request failed before a response arrived, or the body could not be read.
    #[error("request failed")]
    Transport(#[from] reqwest::Error),

    /// The relay rejected the credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// The relay answered with a non-2xx status.
    #[error("HTTP {status}")]
    Status {
        status: u16,
        /// Trimmed body text, or `HTTP {status}` when empty.
        message: String,
    },

    /// The body was not JSON.
    #[error("response body is not JSON")]
    Decode(#[source] serde_json::Error),
}

impl From<HttpError> for DashError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Client(source) | HttpError::Transport(source) => {
                Self::Network(Box::new(source))
            }
            HttpError::Unauthorized => Self::Unauthorized,
            HttpError::Status { status, message } => Self::Http { status, message },
            HttpError::Decode(source) => Self::MalformedBody(source),
        }
    }
}

impl HttpError {
    /// Build a status error from a response body.
    pub(crate) fn status(status: u16, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("HTTP {status}")
        } else {
            body.to_string()
        };
        Self::Status { status, message }
    }
}
