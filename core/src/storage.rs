//! Key-value persistence for the remembered sign-in email.
//!
//! The console persists exactly one value: the email of the last user who
//! signed in with "remember me" ticked, under `REMEMBER_EMAIL_KEY`.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::ClientConfig;
use crate::error::ApiError;

pub const REMEMBER_EMAIL_KEY: &str = "lms_remember_email";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ApiError>;
    fn remove(&mut self, key: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ApiError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ApiError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
///
/// The file is read on every access and rewritten on every change. A
/// missing file is an empty store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the configured `storage_path`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.storage_path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, ApiError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&raw).map_err(|e| ApiError::Serialization(e.to_string()))
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(entries).map_err(|e| ApiError::Serialization(e.to_string()))?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(self.read()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ApiError> {
        let mut entries = self.read()?;
        entries.insert(key.to_string(), value.to_string());
        self.write(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), ApiError> {
        let mut entries = self.read()?;
        if entries.remove(key).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }
}

pub fn remembered_email(store: &impl KeyValueStore) -> Result<Option<String>, ApiError> {
    store.get(REMEMBER_EMAIL_KEY)
}

/// Store `email` when `remember` is set, otherwise clear any stored value.
pub fn update_remembered_email(
    store: &mut impl KeyValueStore,
    email: &str,
    remember: bool,
) -> Result<(), ApiError> {
    if remember {
        store.set(REMEMBER_EMAIL_KEY, email)
    } else {
        store.remove(REMEMBER_EMAIL_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_remember_and_forget() {
        let mut store = MemoryStore::new();
        update_remembered_email(&mut store, "a@b.com", true).unwrap();
        assert_eq!(remembered_email(&store).unwrap().as_deref(), Some("a@b.com"));

        update_remembered_email(&mut store, "a@b.com", false).unwrap();
        assert!(remembered_email(&store).unwrap().is_none());
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));
        assert!(store.get(REMEMBER_EMAIL_KEY).unwrap().is_none());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut store = FileStore::new(&path);
        update_remembered_email(&mut store, "ada@school.edu", true).unwrap();
        store.set("other", "kept").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            remembered_email(&reopened).unwrap().as_deref(),
            Some("ada@school.edu")
        );

        let mut reopened = reopened;
        update_remembered_email(&mut reopened, "ada@school.edu", false).unwrap();
        assert!(remembered_email(&FileStore::new(&path)).unwrap().is_none());
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn file_store_from_config_uses_storage_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            storage_path: dir.path().join("remember.json"),
            ..ClientConfig::default()
        };

        let mut store = FileStore::from_config(&config);
        assert_eq!(store.path(), config.storage_path.as_path());
        update_remembered_email(&mut store, "ada@school.edu", true).unwrap();

        let raw = fs::read_to_string(&config.storage_path).unwrap();
        let stored: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored[REMEMBER_EMAIL_KEY], "ada@school.edu");
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        let err = FileStore::new(&path).get(REMEMBER_EMAIL_KEY).unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }
}
