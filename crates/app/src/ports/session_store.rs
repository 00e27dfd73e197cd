//! Session store port: the two persisted client-side slots.

use relaydash_domain::error::DashError;

/// Named storage slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Base64 `user:pass` of the panel login.
    PanelAuth,
    /// Token sent with `/rotate`.
    RotationToken,
}

impl Slot {
    /// Stable key under which the slot is persisted.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::PanelAuth => "panel_basic_b64",
            Self::RotationToken => "rotateToken",
        }
    }
}

/// Small key/value store surviving between runs.
///
/// Values are stored as given; nothing is validated here.
pub trait SessionStore {
    /// Read a slot, `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Storage`] when the backing medium fails.
    fn get(&self, slot: Slot) -> Result<Option<String>, DashError>;

    /// Write a slot, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Storage`] when the backing medium fails.
    fn set(&self, slot: Slot, value: &str) -> Result<(), DashError>;

    /// Clear a slot. Clearing an unset slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Storage`] when the backing medium fails.
    fn remove(&self, slot: Slot) -> Result<(), DashError>;
}

impl<T: SessionStore + ?Sized> SessionStore for std::sync::Arc<T> {
    fn get(&self, slot: Slot) -> Result<Option<String>, DashError> {
        (**self).get(slot)
    }

    fn set(&self, slot: Slot, value: &str) -> Result<(), DashError> {
        (**self).set(slot, value)
    }

    fn remove(&self, slot: Slot) -> Result<(), DashError> {
        (**self).remove(slot)
    }
}
