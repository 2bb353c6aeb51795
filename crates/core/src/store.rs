//! Key-value persistence seam. The core only relies on `get`/`set`/`remove`
//! with last-writer-wins semantics.

use crate::Language;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub const VOTES_KEY: &str = "all-cards-votes";
pub const RATINGS_KEY: &str = "all-cards-ratings";
pub const GENERATED_CARDS_KEY: &str = "generated-cards";
pub const LANGUAGE_KEY: &str = "all-cards-language";

pub fn game_key(pin: &str) -> String {
    format!("game-{pin}")
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Reads a JSON value, degrading to `None` when the key is missing or malformed.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("ignoring malformed value under {key}: {err}");
            None
        }
    }
}

pub fn read_json_or_default<T: DeserializeOwned + Default>(
    store: &dyn KeyValueStore,
    key: &str,
) -> T {
    read_json(store, key).unwrap_or_default()
}

pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let body = serde_json::to_string(value)?;
    store.set(key, body)
}

/// Stored UI language; anything unknown reads as English.
pub fn load_language(store: &dyn KeyValueStore) -> Language {
    store
        .get(LANGUAGE_KEY)
        .and_then(|code| Language::from_code(&code))
        .unwrap_or_default()
}

pub fn save_language(store: &dyn KeyValueStore, language: Language) -> Result<(), StoreError> {
    store.set(LANGUAGE_KEY, language.code().to_string())
}
