//! Store-specific error type.

use relaydash_domain::error::DashError;

/// Errors originating from the session file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the file failed.
    #[error("session file I/O error")]
    Io(#[from] std::io::Error),

    /// The file exists but is not a TOML table of strings.
    #[error("session file is not valid TOML")]
    Parse(#[from] toml::de::Error),

    /// The slots could not be serialised.
    #[error("failed to serialise session file")]
    Serialize(#[from] toml::ser::Error),
}

impl From<StoreError> for DashError {
    fn from(err: StoreError) -> Self {
        Self::Storage(Box::new(err))
    }
}
