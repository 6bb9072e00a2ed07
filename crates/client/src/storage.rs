//! Durable client-side storage.
//!
//! A small string key-value store that survives restarts, holding the bearer
//! token, the cached user profile, and the remembered login credentials.
//!
//! # Keys
//!
//! See [`keys`]. Values are strings; structured values are stored as JSON.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use foody_core::AuthUser;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, warn};

/// Storage keys.
pub mod keys {
    /// Bearer token of the logged-in user.
    pub const ACCESS_TOKEN: &str = "accessToken";

    /// Cached profile of the logged-in user (JSON).
    pub const AUTH_USER: &str = "authUser";

    /// Credentials of the last successful login or registration (JSON).
    pub const AUTH_CREDENTIALS: &str = "authCredentials";
}

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage lock poisoned")]
    Poisoned,
}

/// A durable string key-value store.
pub trait Storage: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// File Storage
// =============================================================================

/// Storage backed by a single JSON object file.
///
/// The whole map is loaded on open and rewritten (via a temporary file and
/// rename) on every change. The file holds the bearer token and remembered
/// credentials, so on unix it is only readable by its owner.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the storage file, starting empty when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened storage");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the storage file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let contents =
            serde_json::to_string_pretty(entries).map_err(|source| StorageError::Encode {
                key: self.path.display().to_string(),
                source,
            })?;

        let tmp = self.path.with_extension("json.tmp");
        write_private(&tmp, contents.as_bytes()).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

/// Write a file readable by the owner only (mode `0600` on unix).
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // A leftover file keeps its old mode on open.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents)?;
    file.sync_all()
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

// =============================================================================
// Memory Storage
// =============================================================================

/// Volatile storage, for tests and for running without a data directory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .remove(key);
        Ok(())
    }
}

// =============================================================================
// Typed Access
// =============================================================================

/// Credentials of the last successful login or registration.
///
/// Used to prefill the login form on the next run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RememberedCredentials {
    pub email: String,
    #[serde(serialize_with = "expose", deserialize_with = "conceal")]
    pub password: SecretString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn conceal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

/// Typed view over a [`Storage`] for the session keys.
#[derive(Clone)]
pub struct SessionStorage {
    inner: Arc<dyn Storage>,
}

impl std::fmt::Debug for SessionStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStorage").finish_non_exhaustive()
    }
}

impl SessionStorage {
    /// Wrap a storage backend.
    #[must_use]
    pub fn new(inner: Arc<dyn Storage>) -> Self {
        Self { inner }
    }

    /// Stored bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn token(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self
            .inner
            .get(keys::ACCESS_TOKEN)?
            .filter(|t| !t.is_empty())
            .map(SecretString::from))
    }

    /// Store the bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn set_token(&self, token: &SecretString) -> Result<(), StorageError> {
        self.inner.set(keys::ACCESS_TOKEN, token.expose_secret())
    }

    /// Remove the bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn clear_token(&self) -> Result<(), StorageError> {
        self.inner.remove(keys::ACCESS_TOKEN)
    }

    /// Cached user profile. A value that no longer parses is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn user(&self) -> Result<Option<AuthUser>, StorageError> {
        self.read_json(keys::AUTH_USER)
    }

    /// Cache the user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn set_user(&self, user: &AuthUser) -> Result<(), StorageError> {
        self.write_json(keys::AUTH_USER, user)
    }

    /// Remove the cached user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn clear_user(&self) -> Result<(), StorageError> {
        self.inner.remove(keys::AUTH_USER)
    }

    /// Remembered credentials. A value that no longer parses is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn credentials(&self) -> Result<Option<RememberedCredentials>, StorageError> {
        self.read_json(keys::AUTH_CREDENTIALS)
    }

    /// Remember credentials for the next login.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn set_credentials(&self, credentials: &RememberedCredentials) -> Result<(), StorageError> {
        self.write_json(keys::AUTH_CREDENTIALS, credentials)
    }

    fn read_json<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.inner.get(key)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "Ignoring unreadable stored value");
                Ok(None)
            }
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.inner.set(key, &raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set(keys::ACCESS_TOKEN, "tok").unwrap();
        storage.set("other", "value").unwrap();
        storage.remove("other").unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("tok"));
        assert_eq!(reopened.get("other").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let storage = FileStorage::open(&path).unwrap();
        storage.set(keys::ACCESS_TOKEN, "tok").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(storage.get(keys::AUTH_USER).unwrap(), None);
    }

    #[test]
    fn test_file_storage_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            FileStorage::open(&path),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_session_storage_token() {
        let storage = SessionStorage::new(Arc::new(MemoryStorage::new()));
        assert!(storage.token().unwrap().is_none());

        storage.set_token(&SecretString::from("abc")).unwrap();
        assert_eq!(storage.token().unwrap().unwrap().expose_secret(), "abc");

        storage.clear_token().unwrap();
        assert!(storage.token().unwrap().is_none());
    }

    #[test]
    fn test_session_storage_user() {
        let storage = SessionStorage::new(Arc::new(MemoryStorage::new()));
        let user = AuthUser::provisional("a@b.co");

        storage.set_user(&user).unwrap();
        assert_eq!(storage.user().unwrap(), Some(user));
    }

    #[test]
    fn test_session_storage_ignores_unreadable_user() {
        let backend = Arc::new(MemoryStorage::new());
        backend.set(keys::AUTH_USER, "{oops").unwrap();

        let storage = SessionStorage::new(backend);
        assert_eq!(storage.user().unwrap(), None);
    }

    #[test]
    fn test_credentials_round_trip() {
        let storage = SessionStorage::new(Arc::new(MemoryStorage::new()));
        storage
            .set_credentials(&RememberedCredentials {
                email: "a@b.co".to_string(),
                password: SecretString::from("secret1"),
                name: Some("A".to_string()),
                phone: None,
            })
            .unwrap();

        let creds = storage.credentials().unwrap().unwrap();
        assert_eq!(creds.email, "a@b.co");
        assert_eq!(creds.password.expose_secret(), "secret1");
        assert_eq!(creds.phone, None);
    }
}
