use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::types::lock;

/// Storage key of the access token
pub const ACCESS_TOKEN: &str = "access";
/// Storage key of the refresh token
pub const REFRESH_TOKEN: &str = "refresh";

const CREDENTIAL_FILE: &str = "credentials.json";

/// Access + refresh token pair proving an authenticated session
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access: String,
    pub refresh: String,
}

impl Credential {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("credential storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential storage is corrupt: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HOME environment variable not set")]
    NoHome,
}

/// Client-local persistent storage for the credential pair
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credential>, StoreError>;
    fn save(&self, credential: &Credential) -> Result<(), StoreError>;
    /// Remove both tokens
    fn clear(&self) -> Result<(), StoreError>;
}

/// JSON file holding `{"access": ..., "refresh": ...}`
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store inside a configuration directory, creating it when needed
    pub fn in_dir(dir: &Path) -> Result<Self, StoreError> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        Ok(Self::new(dir.join(CREDENTIAL_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let entries: BTreeMap<String, String> = serde_json::from_str(&content)?;

        // A half-written pair cannot drive a refresh, so it counts as absent
        match (entries.get(ACCESS_TOKEN), entries.get(REFRESH_TOKEN)) {
            (Some(access), Some(refresh)) if !access.is_empty() => {
                Ok(Some(Credential::new(access.clone(), refresh.clone())))
            }
            _ => Ok(None),
        }
    }

    fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut entries = BTreeMap::new();
        entries.insert(ACCESS_TOKEN, credential.access.as_str());
        entries.insert(REFRESH_TOKEN, credential.refresh.as_str());

        let content = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.slot).is_none()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>, StoreError> {
        Ok(lock(&self.slot).clone())
    }

    fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        *lock(&self.slot) = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *lock(&self.slot) = None;
        Ok(())
    }
}
