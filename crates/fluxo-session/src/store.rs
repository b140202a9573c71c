//! Durable storage for the bearer token.
//!
//! The session keeps exactly one value across restarts: the token, under
//! the key [`TOKEN_KEY`]. No token stored means "anonymous".
//!
//! Two implementations ship with the crate:
//! - [`FileTokenStore`]: a small JSON file, for real front ends
//! - [`MemoryTokenStore`]: a shared in-memory cell, for tests and
//!   short-lived processes

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::SessionError;

/// The single key the token is persisted under.
pub const TOKEN_KEY: &str = "token";

const ENV_HOME: &str = "FLUXO_HOME";
const FILE_NAME: &str = "session.json";

/// Reads and writes the persisted token.
///
/// Methods take `&self` so a store can be shared by handle; the session
/// manager is the only writer in practice.
pub trait TokenStore: Send + Sync + 'static {
    /// Returns the stored token, or `None` if nothing is stored.
    fn load(&self) -> Result<Option<String>, SessionError>;

    /// Stores `token`, replacing any previous one.
    fn save(&self, token: &str) -> Result<(), SessionError>;

    /// Removes the stored token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), SessionError>;
}

// ---------------------------------------------------------------------------
// MemoryTokenStore
// ---------------------------------------------------------------------------

/// An in-memory token cell.
///
/// Clones share the same cell, so a test can keep one handle to inspect
/// what the session manager wrote through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    cell: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            cell: Arc::new(Mutex::new(Some(token.into()))),
        }
    }

    /// The current value, for inspection.
    pub fn get(&self) -> Option<String> {
        self.cell
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.get())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.cell.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.cell.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileTokenStore
// ---------------------------------------------------------------------------

/// Persists the token as `{"token": "..."}` in a JSON file.
///
/// Writes go to a sibling temp file first and are then renamed over the
/// real one, so a crash mid-write never leaves a half-written token.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$FLUXO_HOME/session.json`, or `.fluxo/session.json` relative to
    /// the working directory when `FLUXO_HOME` is unset.
    pub fn default_path() -> PathBuf {
        std::env::var_os(ENV_HOME)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".fluxo"))
            .join(FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Storage {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for FileTokenStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.storage_error(e)),
        };

        let mut entries: BTreeMap<String, String> =
            serde_json::from_slice(&raw).map_err(|source| {
                SessionError::Corrupt {
                    path: self.path.clone(),
                    source,
                }
            })?;

        Ok(entries.remove(TOKEN_KEY).filter(|token| !token.is_empty()))
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) =
            self.path.parent().filter(|p| !p.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| self.storage_error(e))?;
        }

        let entries = BTreeMap::from([(TOKEN_KEY, token)]);
        let body = serde_json::to_vec_pretty(&entries).map_err(|source| {
            SessionError::Encode {
                path: self.path.clone(),
                source,
            }
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body).map_err(|e| self.storage_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.storage_error(e))?;

        tracing::debug!(path = %self.path.display(), "token persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "token removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.storage_error(e)),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
