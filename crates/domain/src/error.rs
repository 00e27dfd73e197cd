//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`DashError`]
//! at port boundaries.

/// Boxed source error carried across port boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for every dashboard operation.
#[derive(Debug, thiserror::Error)]
pub enum DashError {
    /// The request never produced a response (connection refused, DNS, timeout, …).
    #[error("network request failed")]
    Network(#[source] BoxError),

    /// The relay answered with a non-2xx status.
    #[error("{message}")]
    Http {
        /// Response status code.
        status: u16,
        /// Response body text, or `HTTP {status}` when the body was empty.
        message: String,
    },

    /// The relay rejected the request credentials (HTTP 401).
    #[error("authentication required")]
    Unauthorized,

    /// The response body was not valid JSON.
    #[error("malformed response body")]
    MalformedBody(#[source] serde_json::Error),

    /// Local input was rejected before any request was issued.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The session store failed to read or write.
    #[error("storage error")]
    Storage(#[source] BoxError),
}

impl DashError {
    /// Whether the error means the current login must be re-entered.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Local input that was rejected before reaching the relay.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Both user and password were empty.
    #[error("nothing to save")]
    EmptyCredentials,

    /// The rotation token was empty after trimming.
    #[error("rotation token is empty")]
    EmptyToken,

    /// A login attempt was missing the user or the password.
    #[error("user and password are required")]
    MissingLogin,

    /// A stored credential blob could not be decoded.
    #[error("stored credentials are not valid base64 `user:pass`")]
    InvalidCredentialBlob,
}
