//! Local persistence of favorites and recent searches.
//!
//! Storage is a flat string key-value map. Each list lives under its own key
//! as a JSON array of names. Reads never fail: absent or malformed content
//! yields an empty list.

use std::{
    collections::BTreeMap,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    error::StorageError,
    places::{Favorites, Recents},
};

pub const FAVORITES_KEY: &str = "favorites";
pub const RECENTS_KEY: &str = "recent";

pub trait KeyValueStore: Send + Debug {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Key-value map kept as one JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), "Ignoring malformed storage file: {err}");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), "Failed to read storage file: {err}");
                BTreeMap::new()
            }
        };

        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }
}

/// Typed access to the two stored lists.
#[derive(Debug)]
pub struct Persistence {
    store: Box<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    pub fn load_favorites(&self) -> Favorites {
        Favorites::from_names(self.load_names(FAVORITES_KEY))
    }

    pub fn load_recents(&self) -> Recents {
        Recents::from_names(self.load_names(RECENTS_KEY))
    }

    pub fn save_favorites(&mut self, favorites: &Favorites) -> Result<(), StorageError> {
        self.save_names(FAVORITES_KEY, favorites.as_slice())
    }

    pub fn save_recents(&mut self, recents: &Recents) -> Result<(), StorageError> {
        self.save_names(RECENTS_KEY, recents.as_slice())
    }

    fn load_names(&self, key: &str) -> Vec<String> {
        let Some(raw) = self.store.get(key) else {
            return Vec::new();
        };

        serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(key, "Ignoring malformed stored list: {err}");
            Vec::new()
        })
    }

    fn save_names(&mut self, key: &str, names: &[String]) -> Result<(), StorageError> {
        let json = serde_json::to_string(names)?;
        self.store.set(key, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_keys_load_empty() {
        let persistence = Persistence::in_memory();
        assert!(persistence.load_favorites().is_empty());
        assert!(persistence.load_recents().is_empty());
    }

    #[test]
    fn malformed_values_load_empty() {
        let store = MemoryStore::new()
            .with_entry(FAVORITES_KEY, "{not json")
            .with_entry(RECENTS_KEY, r#"{"a": 1}"#);
        let persistence = Persistence::new(Box::new(store));

        assert!(persistence.load_favorites().is_empty());
        assert!(persistence.load_recents().is_empty());
    }

    #[test]
    fn lists_are_stored_as_json_arrays() {
        let mut persistence = Persistence::in_memory();
        let mut recents = Recents::default();
        recents.push("Paris");
        recents.push("Oslo");
        persistence.save_recents(&recents).unwrap();

        assert_eq!(
            persistence.store.get(RECENTS_KEY).as_deref(),
            Some(r#"["Oslo","Paris"]"#)
        );
        assert_eq!(persistence.load_recents(), recents);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut persistence = Persistence::new(Box::new(FileStore::open(&path)));
        let mut favorites = Favorites::default();
        favorites.toggle("Lisbon");
        persistence.save_favorites(&favorites).unwrap();

        let reopened = Persistence::new(Box::new(FileStore::open(&path)));
        assert_eq!(reopened.load_favorites(), favorites);
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "garbage").unwrap();

        let store = FileStore::open(&path);
        assert!(store.get(FAVORITES_KEY).is_none());
        assert_eq!(store.path(), path.as_path());
    }
}
