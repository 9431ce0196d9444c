//! In-process key-value store

use super::KeyValueStore;
use crate::error::{RecorderError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Map-backed store whose clones share the same contents
///
/// Two recorders built on clones of one store behave like two page loads in
/// the same browsing origin.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    available: Arc<AtomicBool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulate storage being blocked; every operation fails while unavailable
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RecorderError::Storage("storage is not accessible".to_string()))
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| RecorderError::Storage("storage lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.check_available()?;
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);

        // Removing twice is fine
        store.remove("a").unwrap();
    }

    #[test]
    fn test_clones_share_contents() {
        let mut store = MemoryStore::new();
        let view = store.clone();
        store.set("session", "abc").unwrap();
        assert_eq!(view.get("session").unwrap().as_deref(), Some("abc"));
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_unavailable_store_errors() {
        let mut store = MemoryStore::new();
        store.set_available(false);
        assert!(store.get("a").is_err());
        assert!(store.set("a", "1").is_err());
        assert!(store.remove("a").is_err());
    }
}
