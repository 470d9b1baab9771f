//! Durable token storage
//!
//! A single slot holding the raw token string. Absence means "logged out".
//! Access is synchronous; the session store mirrors every token mutation
//! here while holding the lock on its in-memory copy.

use super::error::StorageError;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Storage backend for the session token.
///
/// Implementations can store the token in a file, a keychain, or memory.
/// Tokens must never be logged in full.
pub trait TokenStorage: Send + Sync {
    /// Returns `Ok(None)` when no token is stored
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Overwrites any previously stored token
    fn save(&self, token: &str) -> Result<(), StorageError>;

    /// Removes the stored token. Succeeds when nothing was stored.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Get the default path of the token file
pub fn default_token_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sessiongate")
        .join("auth.token")
}

/// Token stored as a plain file, readable only by the owner on Unix
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileTokenStorage {
    fn default() -> Self {
        Self::new(default_token_path())
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        debug!("Looking for auth token at: {}", self.path.display());
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    debug!("Token found, length: {}", token.len());
                    Ok(Some(token.to_string()))
                }
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

            // Owner-only from creation; an existing file is narrowed before the write
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .map_err(write_err)?;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(write_err)?;
            file.write_all(token.as_bytes()).map_err(write_err)?;
        }

        #[cfg(not(unix))]
        std::fs::write(&self.path, token).map_err(write_err)?;

        debug!("Token saved to: {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Token removed from: {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// In-memory token storage.
///
/// Does NOT persist across restarts. Useful for tests and ephemeral clients.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot() = None;
        Ok(())
    }
}

impl<T: TokenStorage + ?Sized> TokenStorage for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<String>, StorageError> {
        (**self).load()
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        (**self).save(token)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}
