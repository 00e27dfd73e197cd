//! Credentials, credential domains and the rotation token.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Which credential set on the relay an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialDomain {
    /// Credentials clients use to authenticate against the proxy.
    Proxy,
    /// Credentials for this admin panel.
    Panel,
}

impl CredentialDomain {
    /// Path segment used by `/auth/{domain}/…` endpoints.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Proxy => "proxy",
            Self::Panel => "panel",
        }
    }
}

impl fmt::Display for CredentialDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque user/password pair. Never validated beyond emptiness.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub pass: String,
}

impl Credentials {
    #[must_use]
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: pass.into(),
        }
    }

    /// Build login credentials from raw input; both fields are required.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingLogin`] when the trimmed user or the
    /// password is empty.
    pub fn login(user: &str, pass: &str) -> Result<Self, ValidationError> {
        let user = user.trim();
        if user.is_empty() || pass.is_empty() {
            return Err(ValidationError::MissingLogin);
        }
        Ok(Self::new(user, pass))
    }

    /// Build credentials to save on the relay; at least one field is required.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCredentials`] when both trimmed fields
    /// are empty.
    pub fn for_update(user: &str, pass: &str) -> Result<Self, ValidationError> {
        let (user, pass) = (user.trim(), pass.trim());
        if user.is_empty() && pass.is_empty() {
            return Err(ValidationError::EmptyCredentials);
        }
        Ok(Self::new(user, pass))
    }

    /// Whether both fields are set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.user.is_empty() && !self.pass.is_empty()
    }

    /// Reversible Base64 encoding of `user:pass`.
    #[must_use]
    pub fn encode(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.user, self.pass))
    }

    /// Decode a blob produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCredentialBlob`] when the blob is not
    /// Base64 of UTF-8 `user:pass`.
    pub fn decode(blob: &str) -> Result<Self, ValidationError> {
        let bytes = STANDARD
            .decode(blob.trim())
            .map_err(|_| ValidationError::InvalidCredentialBlob)?;
        let text = String::from_utf8(bytes).map_err(|_| ValidationError::InvalidCredentialBlob)?;
        let (user, pass) = text
            .split_once(':')
            .ok_or(ValidationError::InvalidCredentialBlob)?;
        Ok(Self::new(user, pass))
    }

    /// Value of an HTTP `Authorization` header for Basic auth.
    #[must_use]
    pub fn basic_header(&self) -> String {
        format!("Basic {}", self.encode())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("pass", &"***")
            .finish()
    }
}

/// Free-text token authorising `/rotate` calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RotationToken(String);

impl RotationToken {
    /// Access the token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RotationToken {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        <Self as TryFrom<&str>>::try_from(value.as_str())
    }
}

impl TryFrom<&str> for RotationToken {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyToken);
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<RotationToken> for String {
    fn from(token: RotationToken) -> Self {
        token.0
    }
}
