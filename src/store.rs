//! Key-value persistence for the two JSON blobs the app keeps: the signed-in
//! user and the trip collection.
//!
//! Each key is written independently and immediately. There is no transaction
//! spanning keys.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::error::{StoreError, WriteError};

pub const USER_KEY: &str = "tripmates-user";
pub const TRIPS_KEY: &str = "tripmates-trips";

/// Per-value quota, matching what browser local storage typically allows.
pub const MAX_VALUE_BYTES: usize = 5 * 1024 * 1024;

pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

fn check_quota(key: &str, value: &str) -> Result<(), StoreError> {
    if value.len() > MAX_VALUE_BYTES {
        return Err(StoreError::QuotaExceeded {
            key: key.to_string(),
            len: value.len(),
            limit: MAX_VALUE_BYTES,
        });
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// A poisoned lock still holds a usable map, so recover it rather than fail.
impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        check_quota(key, value)?;
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            // Non UTF-8 content goes up as an empty value, which fails to parse
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                warn!("Unreadable {}: {err}", path.display());
                Ok(Some(String::new()))
            }
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Writes a sibling `.tmp` file and renames it over the target, so a
    /// reader sees either the old value or the new one.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        check_quota(key, value)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        if let Err(source) = fs::write(&tmp, value) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::Io { path: tmp, source });
        }
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

/// Outcome of reading a typed value.
#[derive(Debug, PartialEq)]
pub enum Stored<T> {
    Missing,
    Corrupt,
    Value(T),
}

impl<T> Stored<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Stored::Value(value) => Some(value),
            Stored::Missing | Stored::Corrupt => None,
        }
    }
}

/// JSON view over a [`Store`].
#[derive(Clone)]
pub struct StoreAdapter {
    store: Arc<dyn Store>,
}

impl StoreAdapter {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Reads and parses `key`. Unparsable or unreadable content is logged and
    /// reported as [`Stored::Corrupt`], never as an error.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Stored<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Stored::Missing,
            Err(err) => {
                warn!("Failed to read {key}: {err}");
                return Stored::Corrupt;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Stored::Value(value),
            Err(err) => {
                warn!("Failed to parse stored {key}: {err}");
                Stored::Corrupt
            }
        }
    }

    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.load(key).into_option()
    }

    /// Like [`StoreAdapter::read`], but a corrupt entry is also removed.
    pub fn read_or_discard<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.load(key) {
            Stored::Value(value) => Some(value),
            Stored::Missing => None,
            Stored::Corrupt => {
                if let Err(err) = self.store.remove(key) {
                    warn!("Failed to discard corrupt {key}: {err}");
                } else {
                    debug!("Discarded corrupt {key}");
                }
                None
            }
        }
    }

    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), WriteError> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.store.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn adapter() -> (Arc<MemoryStore>, StoreAdapter) {
        let store = Arc::new(MemoryStore::new());
        let adapter = StoreAdapter::new(store.clone());
        (store, adapter)
    }

    #[test]
    fn missing_key_reads_as_none() {
        let (_, adapter) = adapter();
        assert_eq!(adapter.load::<serde_json::Value>("nope"), Stored::Missing);
    }

    #[test]
    fn written_value_reads_back() {
        let (_, adapter) = adapter();
        adapter.write("k", &json!({"a": [1, 2]})).unwrap();
        assert_eq!(adapter.read::<serde_json::Value>("k"), Some(json!({"a": [1, 2]})));
    }

    #[test]
    fn corrupt_value_reads_as_none_and_stays() {
        let (store, adapter) = adapter();
        store.set("k", "{not json").unwrap();
        assert_eq!(adapter.read::<serde_json::Value>("k"), None);
        assert!(store.get("k").unwrap().is_some());
    }

    #[test]
    fn read_or_discard_clears_corrupt_entry() {
        let (store, adapter) = adapter();
        store.set("k", "[1,").unwrap();
        assert_eq!(adapter.read_or_discard::<Vec<u32>>("k"), None);
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn oversized_value_is_rejected() {
        let store = MemoryStore::new();
        let big = "x".repeat(MAX_VALUE_BYTES + 1);
        assert!(matches!(
            store.set("k", &big),
            Err(StoreError::QuotaExceeded { .. })
        ));
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn file_store_overwrite_leaves_no_temp_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set(TRIPS_KEY, "[]").unwrap();
        store.set(TRIPS_KEY, r#"[{"id":"1"}]"#).unwrap();
        assert_eq!(store.get(TRIPS_KEY).unwrap().as_deref(), Some(r#"[{"id":"1"}]"#));
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("tripmates-trips.json")]);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("data")).unwrap();
        assert_eq!(store.get(USER_KEY).unwrap(), None);
        store.set(USER_KEY, r#"{"id":"1"}"#).unwrap();
        assert!(dir.path().join("data").join("tripmates-user.json").is_file());
        assert_eq!(store.get(USER_KEY).unwrap().as_deref(), Some(r#"{"id":"1"}"#));
        store.remove(USER_KEY).unwrap();
        store.remove(USER_KEY).unwrap();
        assert_eq!(store.get(USER_KEY).unwrap(), None);
    }
}
