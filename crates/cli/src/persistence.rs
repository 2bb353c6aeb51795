use allcards_core::{KeyValueStore, StoreError};
use log::warn;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub fn default_store_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ALLCARDS_STORE") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".allcards_store.json"))
}

/// Key-value store persisted as one JSON object. Every write rewrites the file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens `path`, starting empty when the file is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match load_entries(&path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("starting with an empty store: {err}");
                BTreeMap::new()
            }
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(entries)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StoreError::Unavailable(err.to_string()))?;
        }
        fs::write(&self.path, body).map_err(|err| {
            StoreError::Unavailable(format!("write {}: {err}", self.path.display()))
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value);
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, String>, String> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let body = fs::read_to_string(path).map_err(|err| format!("read {}: {err}", path.display()))?;
    serde_json::from_str(&body).map_err(|err| format!("parse {}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn values_survive_reopen() {
        let file = unique_temp_file();
        let store = FileStore::open(&file);
        store.set("all-cards-language", "tr".to_string()).expect("set");
        store.set("game-1234", "{}".to_string()).expect("set");
        store.remove("game-1234").expect("remove");

        let reopened = FileStore::open(&file);
        assert_eq!(reopened.get("all-cards-language").as_deref(), Some("tr"));
        assert!(reopened.get("game-1234").is_none());
        let _ = fs::remove_file(&file);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let file = unique_temp_file();
        fs::write(&file, "not json").expect("write");
        let store = FileStore::open(&file);
        assert!(store.get("anything").is_none());
        store.set("k", "v".to_string()).expect("set");
        assert_eq!(FileStore::open(&file).get("k").as_deref(), Some("v"));
        let _ = fs::remove_file(&file);
    }

    #[test]
    fn missing_file_is_not_created_until_write() {
        let file = unique_temp_file();
        let store = FileStore::open(&file);
        assert!(!file.exists());
        store.remove("nothing").expect("remove");
        assert!(!file.exists());
    }

    fn unique_temp_file() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "allcards_cli_store_test_{}_{}.json",
            std::process::id(),
            nanos
        ))
    }
}
