//! Durable credential persistence.
//!
//! One string value (the bearer token) is kept under [`CREDENTIAL_KEY`] in a
//! small key/value store. The file-backed store keeps other keys it finds
//! untouched.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use talent_models::Credential;
use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};

/// Key under which the bearer token is persisted.
pub const CREDENTIAL_KEY: &str = "access_token";

/// File name of the key/value store inside the state directory.
const CREDENTIAL_FILE: &str = "credentials.json";

/// Persisted storage for the bearer credential.
pub trait CredentialStore: Send + Sync {
    /// Read the stored credential, if any.
    fn load(&self) -> StorageResult<Option<Credential>>;

    /// Persist `credential`, replacing any previous one.
    fn save(&self, credential: &Credential) -> StorageResult<()>;

    /// Delete the stored credential. Clearing an empty store is not an error.
    fn clear(&self) -> StorageResult<()>;
}

// =============================================================================
// File store
// =============================================================================

/// JSON key/value file in a state directory.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store living in `state_dir/credentials.json`. The directory is created
    /// on first write.
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(CREDENTIAL_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> StorageResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Entries to rewrite. A file that no longer parses is started over.
    fn entries_for_write(&self) -> StorageResult<BTreeMap<String, String>> {
        match self.read_entries() {
            Err(StorageError::Corrupt(e)) => {
                warn!(path = %self.path.display(), error = %e, "Overwriting corrupt credential file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    /// Write to a sibling temp file and rename over the original.
    fn write_entries(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = open_private(&tmp)?;
            file.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::File::create(path)
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> StorageResult<Option<Credential>> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(CREDENTIAL_KEY)
            .map(Credential::new)
            .filter(|c| !c.is_empty()))
    }

    fn save(&self, credential: &Credential) -> StorageResult<()> {
        let mut entries = self.entries_for_write()?;
        entries.insert(CREDENTIAL_KEY.to_string(), credential.as_str().to_string());
        self.write_entries(&entries)?;
        debug!(path = %self.path.display(), "Saved credential");
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StorageError::Corrupt(e)) => {
                warn!(path = %self.path.display(), error = %e, "Removing corrupt credential file");
                fs::remove_file(&self.path)?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        if entries.remove(CREDENTIAL_KEY).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)?;
        debug!(path = %self.path.display(), "Cleared credential");
        Ok(())
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Process-local store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a credential.
    pub fn with_credential(credential: &Credential) -> Self {
        let store = Self::new();
        store.entries().insert(CREDENTIAL_KEY.to_string(), credential.as_str().to_string());
        store
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> StorageResult<Option<Credential>> {
        Ok(self.entries().get(CREDENTIAL_KEY).map(Credential::new))
    }

    fn save(&self, credential: &Credential) -> StorageResult<()> {
        self.entries()
            .insert(CREDENTIAL_KEY.to_string(), credential.as_str().to_string());
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.entries().remove(CREDENTIAL_KEY);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("state"));

        assert_eq!(store.load().unwrap(), None);
        store.save(&Credential::new("tok-1")).unwrap();
        assert_eq!(store.load().unwrap(), Some(Credential::new("tok-1")));

        // A second handle on the same directory sees the persisted value.
        let reopened = FileCredentialStore::new(dir.path().join("state"));
        assert_eq!(reopened.load().unwrap(), Some(Credential::new("tok-1")));

        store.clear().unwrap();
        assert_eq!(reopened.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        fs::write(store.path(), r#"{"theme": "dark"}"#).unwrap();

        store.save(&Credential::new("tok-1")).unwrap();
        store.clear().unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("dark"));
        assert!(!text.contains("tok-1"));
    }

    #[test]
    fn test_file_store_clear_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("never-written"));
        store.clear().unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(
            store.load(),
            Err(crate::error::StorageError::Corrupt(_))
        ));
    }

    #[test]
    fn test_file_store_save_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        fs::write(store.path(), "{ truncated").unwrap();

        store.save(&Credential::new("tok-1")).unwrap();
        assert_eq!(store.load().unwrap(), Some(Credential::new("tok-1")));
    }

    #[test]
    fn test_file_store_clear_removes_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        fs::write(store.path(), "{ truncated").unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert_eq!(store.load().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        store.save(&Credential::new("tok-1")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::with_credential(&Credential::new("tok-1"));
        assert!(store.load().unwrap().is_some());
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
