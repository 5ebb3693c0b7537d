//! Key/value cache contract for reduced waveforms
//!
//! Entries are JSON-serialized [`AmplitudeSeries`](crate::amplitude::AmplitudeSeries)
//! keyed by `"<namespace>:" + source_url`.

use std::collections::HashMap;
use std::sync::Mutex;

/// String key → string value store
pub trait KeyValueCache {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

/// Build the cache key for a waveform source
pub fn cache_key(namespace: &str, url: &str) -> String {
    format!("{}:{}", namespace, url)
}

/// In-process cache backed by a map
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value);
        }
    }
}

/// Caching disabled: every lookup misses, writes are dropped
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl KeyValueCache for NoCache {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: String) {}
}

impl<C: KeyValueCache + ?Sized> KeyValueCache for std::sync::Arc<C> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) {
        (**self).set(key, value)
    }
}
