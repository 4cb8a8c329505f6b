//! Process-wide session context backed by a single persistence adapter.
//!
//! Credentials are read from the store on every access; nothing is cached in
//! memory, so a token rotated by another process or a refresh flow takes
//! effect on the next request.

mod store;

pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

use crate::error::CoreError;
use crate::models::auth::TokenPair;
use crate::models::DocumentId;
use crate::settings::{or_default, DisplaySettings, SettingsPatch};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Everything the client persists between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(rename = "authToken", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(rename = "openDocId", default, skip_serializing_if = "Option::is_none")]
    pub open_document_id: Option<DocumentId>,
    #[serde(rename = "userSettings", default, deserialize_with = "or_default")]
    pub settings: DisplaySettings,
}

/// Shared handle to the session context.
pub type SessionHandle = Arc<Session>;

/// Explicit session context passed by reference to everything that needs
/// credentials or persisted UI state.
pub struct Session {
    store: Box<dyn SessionStore>,
    // Serializes read-modify-write cycles against the store.
    write_lock: Mutex<()>,
}

fn nonempty(value: Option<String>) -> Option<String> {
    value.filter(|token| !token.trim().is_empty())
}

impl Session {
    /// Open the session backed by `store`.
    ///
    /// A corrupt stored session is logged and replaced with an empty one so
    /// the client starts logged out rather than failing to launch.
    ///
    /// # Errors
    /// Returns an error when the store cannot be read or reset.
    pub fn init(store: impl SessionStore + 'static) -> Result<SessionHandle, CoreError> {
        match store.load() {
            Ok(_) => {}
            Err(CoreError::Serialization(err)) => {
                warn!("stored session is unreadable ({}); starting fresh", err);
                store.clear()?;
            }
            Err(err) => return Err(err),
        }
        Ok(Arc::new(Self {
            store: Box::new(store),
            write_lock: Mutex::new(()),
        }))
    }

    /// Session with no persistence beyond this process.
    pub fn ephemeral() -> SessionHandle {
        Arc::new(Self {
            store: Box::new(MemorySessionStore::default()),
            write_lock: Mutex::new(()),
        })
    }

    fn snapshot(&self) -> PersistedSession {
        match self.store.load() {
            Ok(session) => session,
            Err(err) => {
                warn!("failed to read session store: {}", err);
                PersistedSession::default()
            }
        }
    }

    fn modify<R>(&self, edit: impl FnOnce(&mut PersistedSession) -> R) -> Result<R, CoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| CoreError::Storage("session write lock poisoned".to_string()))?;
        let mut session = self.store.load()?;
        let result = edit(&mut session);
        self.store.save(&session)?;
        Ok(result)
    }

    /// Current bearer token, read fresh from the store.
    pub fn access_token(&self) -> Option<String> {
        nonempty(self.snapshot().access_token)
    }

    /// Current refresh token, read fresh from the store.
    pub fn refresh_token(&self) -> Option<String> {
        nonempty(self.snapshot().refresh_token)
    }

    /// Whether a non-empty access token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Persist tokens from a login; an absent refresh token keeps the old one.
    pub fn store_tokens(&self, tokens: &TokenPair) -> Result<(), CoreError> {
        self.modify(|session| {
            session.access_token = Some(tokens.access_token.clone());
            if let Some(refresh) = nonempty(tokens.refresh_token.clone()) {
                session.refresh_token = Some(refresh);
            }
        })
    }

    /// Replace only the access token (after a refresh).
    pub fn set_access_token(&self, token: &str) -> Result<(), CoreError> {
        self.modify(|session| session.access_token = Some(token.to_string()))
    }

    /// Drop both tokens, keeping the open document and settings.
    pub fn clear_tokens(&self) -> Result<(), CoreError> {
        self.modify(|session| {
            session.access_token = None;
            session.refresh_token = None;
        })
    }

    pub fn open_document_id(&self) -> Option<DocumentId> {
        self.snapshot().open_document_id
    }

    pub fn set_open_document(&self, id: Option<DocumentId>) -> Result<(), CoreError> {
        self.modify(|session| session.open_document_id = id)
    }

    pub fn settings(&self) -> DisplaySettings {
        self.snapshot().settings
    }

    /// Merge `patch` into the stored settings.
    ///
    /// # Returns
    /// The settings now in effect.
    pub fn update_settings(&self, patch: SettingsPatch) -> Result<DisplaySettings, CoreError> {
        self.modify(|session| {
            session.settings = session.settings.merged(patch);
            session.settings
        })
    }

    /// End the session: tokens and the open document are cleared in one write.
    pub fn logout(&self) -> Result<(), CoreError> {
        self.modify(|session| {
            let settings = session.settings;
            *session = PersistedSession {
                settings,
                ..PersistedSession::default()
            };
        })
    }
}

#[cfg(test)]
mod tests;
