//! Persistence for the signed-in session.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session lives under a single storage key: one JSON file for the CLI,
//! or process memory for tests and embedders. Reads happen on every
//! authenticated action; writes only at login and logout.

#[cfg(test)]
#[path = "session_store_test.rs"]
mod session_store_test;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::auth::AuthState;

/// Errors raised while writing or clearing the stored session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session encode failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Get/set/clear access to the persisted session.
pub trait SessionStore: Send + Sync {
    /// Stored session, or `None` when logged out.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the storage cannot be read.
    fn get(&self) -> Result<Option<AuthState>, SessionError>;

    /// Persist `session`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the storage cannot be written.
    fn set(&self, session: &AuthState) -> Result<(), SessionError>;

    /// Remove the stored session. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the storage cannot be modified.
    fn clear(&self) -> Result<(), SessionError>;
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Session persisted as one JSON file.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Result<Option<AuthState>, SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        // A corrupt key reads as logged out rather than failing every view.
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    fn set(&self, session: &AuthState) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-process session slot.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<AuthState>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn with_session(session: AuthState) -> Self {
        Self { slot: Mutex::new(Some(session)) }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Result<Option<AuthState>, SessionError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    fn set(&self, session: &AuthState) -> Result<(), SessionError> {
        *self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        Ok(())
    }
}
