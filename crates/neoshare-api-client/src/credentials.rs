//! Persisted client-side credentials
//!
//! The token and serialized identity survive process restarts. They are
//! read at client construction, written on every login/logout/revalidation,
//! and cleared by the HTTP adapter whenever the server answers 401.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use neoshare_core::models::UserIdentity;
use neoshare_core::{ClientError, ClientResult};

/// Token plus the last-known identity, as persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserIdentity>,
}

/// Durable storage for the session token and identity.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> ClientResult<Option<StoredCredentials>>;
    fn store(&self, credentials: &StoredCredentials) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

/// JSON file in the user's config directory.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCredentialStore { path: path.into() }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> ClientResult<Option<StoredCredentials>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ClientError::Io(e)),
        };
        let credentials = serde_json::from_str(&raw)?;
        Ok(Some(credentials))
    }

    fn store(&self, credentials: &StoredCredentials) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write-then-rename so a crash mid-write cannot truncate the file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(credentials)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Io(e)),
        }
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<StoredCredentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        MemoryCredentialStore {
            inner: Mutex::new(Some(StoredCredentials {
                token: token.to_string(),
                user: None,
            })),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> ClientResult<Option<StoredCredentials>> {
        Ok(self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn store(&self, credentials: &StoredCredentials) -> ClientResult<()> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
