//! Persisted search history behind a key-value seam.
//!
//! Hosts bind [`KeyValueStore`] to whatever persistence they have (browser
//! local storage, a file, nothing). History is best-effort: a failing store
//! degrades to an empty history, never to an error the search path sees.

use crate::error::StoreError;

/// Minimal string-keyed persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and hosts without persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: std::collections::HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

pub const DEFAULT_MAX_ITEMS: usize = 10;
pub const DEFAULT_BYTE_BUDGET: usize = 4096;
const STORAGE_KEY: &str = "tourex.history";

/// Recent search terms, newest first, capped by count and payload size.
///
/// Terms persist as a JSON string array under one key. Recording an existing
/// term moves it to the front instead of duplicating it; eviction always
/// drops the oldest entry first, both when the item cap and when the byte
/// budget overflows.
pub struct SearchHistory<S: KeyValueStore> {
    store: S,
    key: String,
    max_items: usize,
    byte_budget: usize,
}

impl<S: KeyValueStore> SearchHistory<S> {
    pub fn new(store: S) -> Self {
        SearchHistory {
            store,
            key: STORAGE_KEY.to_string(),
            max_items: DEFAULT_MAX_ITEMS,
            byte_budget: DEFAULT_BYTE_BUDGET,
        }
    }

    pub fn with_limits(store: S, max_items: usize, byte_budget: usize) -> Self {
        SearchHistory {
            store,
            key: STORAGE_KEY.to_string(),
            max_items,
            byte_budget,
        }
    }

    /// Terms on record, newest first. A missing or unreadable payload is an
    /// empty history.
    pub fn items(&self) -> Vec<String> {
        let payload = match self.store.get(&self.key) {
            Ok(Some(p)) => p,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("history read failed: {e}");
                return Vec::new();
            }
        };
        match serde_json::from_str(&payload) {
            Ok(items) => items,
            Err(e) => {
                log::warn!("history payload unreadable, resetting: {e}");
                Vec::new()
            }
        }
    }

    /// Record one executed term.
    pub fn record(&mut self, term: &str) -> Result<(), StoreError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(());
        }

        let mut items = self.items();
        items.retain(|t| !t.eq_ignore_ascii_case(term));
        items.insert(0, term.to_string());

        items.truncate(self.max_items);
        let mut payload = serde_json::to_string(&items).unwrap_or_default();
        while payload.len() > self.byte_budget && items.len() > 1 {
            items.pop();
            payload = serde_json::to_string(&items).unwrap_or_default();
        }

        self.store.put(&self.key, &payload)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.remove(&self.key)
    }
}
