//! File-backed implementation of [`SessionStore`].

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use relaydash_app::ports::{SessionStore, Slot};
use relaydash_domain::error::DashError;

use crate::error::StoreError;

type Slots = BTreeMap<String, String>;

/// Session slots persisted as a flat TOML table.
///
/// The file is re-read on every access so that several processes sharing it
/// see each other's writes. A missing file is an empty store.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Slots, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Slots::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Replace the file atomically. The temporary file is created owner-only
    /// on Unix, so the stored login is never world-readable.
    fn save(&self, slots: &Slots) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;
        // same directory as the target, so the rename stays on one filesystem
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(toml::to_string(slots)?.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }

    fn modify(&self, f: impl FnOnce(&mut Slots)) -> Result<(), StoreError> {
        // the file, not the lock, holds the state
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut slots = self.load()?;
        f(&mut slots);
        self.save(&slots)?;
        tracing::debug!(path = %self.path.display(), "session file written");
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, slot: Slot) -> Result<Option<String>, DashError> {
        let mut slots = self.load()?;
        Ok(slots.remove(slot.key()))
    }

    fn set(&self, slot: Slot, value: &str) -> Result<(), DashError> {
        self.modify(|slots| {
            slots.insert(slot.key().to_string(), value.to_string());
        })?;
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<(), DashError> {
        if !self.path.exists() {
            return Ok(());
        }
        self.modify(|slots| {
            slots.remove(slot.key());
        })?;
        Ok(())
    }
}
