//! Persistence adapters for [`PersistedSession`].

use super::PersistedSession;
use crate::error::CoreError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Backing storage for session state.
///
/// Implementations must return the latest saved value from every `load` so
/// that out-of-band writes (another process rotating the token) are seen on
/// the next call.
pub trait SessionStore: Send + Sync {
    /// Read the stored session; a missing store yields the default session.
    fn load(&self) -> Result<PersistedSession, CoreError>;
    /// Replace the stored session.
    fn save(&self, session: &PersistedSession) -> Result<(), CoreError>;
    /// Remove every stored key.
    fn clear(&self) -> Result<(), CoreError>;
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn load(&self) -> Result<PersistedSession, CoreError> {
        (**self).load()
    }

    fn save(&self, session: &PersistedSession) -> Result<(), CoreError> {
        (**self).save(session)
    }

    fn clear(&self) -> Result<(), CoreError> {
        (**self).clear()
    }
}

/// JSON file store; writes go through a temp file and rename.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<PersistedSession, CoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(PersistedSession::default()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(PersistedSession::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, session: &PersistedSession) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let encoded = serde_json::to_vec_pretty(session)?;
        let temp = self.temp_path();
        fs::write(&temp, encoded)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<PersistedSession>,
}

impl MemorySessionStore {
    pub fn new(initial: PersistedSession) -> Self {
        Self {
            inner: Mutex::new(initial),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, PersistedSession>, CoreError> {
        self.inner
            .lock()
            .map_err(|_| CoreError::Storage("session store lock poisoned".to_string()))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<PersistedSession, CoreError> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<(), CoreError> {
        *self.lock()? = session.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        *self.lock()? = PersistedSession::default();
        Ok(())
    }
}
