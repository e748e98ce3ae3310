//! Key-value persistence port.
//!
//! Everything the console keeps lives under a handful of fixed keys holding
//! JSON text. Command handlers depend on [`KeyValueStore`] only; the SQLite
//! adapter lives in `commands::db`, the in-memory one here.
//!
//! Absent keys read as the type's default. Values that no longer decode are
//! logged and also read as default.

pub mod repository;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

pub const CONTRACTS_KEY: &str = "api-contracts";
pub const LANGUAGE_KEY: &str = "app-language";
pub const THEME_KEY: &str = "app-theme";
const SNAPSHOT_PREFIX: &str = "api-snapshot:";

pub fn snapshot_key(api_id: &str) -> String {
    format!("{SNAPSHOT_PREFIX}{api_id}")
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&self, key: &str) -> Result<(), String>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        let entries = self.entries.lock().map_err(|_| "Store lock error".to_string())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let mut entries = self.entries.lock().map_err(|_| "Store lock error".to_string())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        let mut entries = self.entries.lock().map_err(|_| "Store lock error".to_string())?;
        entries.remove(key);
        Ok(())
    }
}

pub fn read_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<T, String>
where
    T: DeserializeOwned + Default,
{
    Ok(read_json_opt(store, key)?.unwrap_or_default())
}

pub fn read_json_opt<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, String>
where
    T: DeserializeOwned,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            log::warn!("Ignoring undecodable value under '{key}': {e}");
            Ok(None)
        }
    }
}

pub fn write_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), String>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|e| format!("Failed to serialize '{key}': {e}"))?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_corrupt_keys_read_as_default() {
        let store = MemoryStore::new();
        let empty: Vec<String> = read_json(&store, "missing").expect("read missing");
        assert!(empty.is_empty());

        store.set("broken", "{not json").expect("set raw");
        let fallback: Vec<String> = read_json(&store, "broken").expect("read broken");
        assert!(fallback.is_empty());
    }

    #[test]
    fn json_helpers_round_trip_and_remove() {
        let store = MemoryStore::new();
        write_json(&store, "list", &vec!["a".to_string()]).expect("write");
        let back: Vec<String> = read_json(&store, "list").expect("read");
        assert_eq!(back, vec!["a".to_string()]);

        store.remove("list").expect("remove");
        assert_eq!(store.get("list").expect("get"), None);
    }
}
