use anyhow::Result;
use dashmap::DashMap;

use super::KeyValueStore;

/// Process-local store. Nothing survives a restart.
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let store = MemoryStore::new();
        store.set("token", "abc").unwrap();

        assert_eq!(store.get("token").unwrap().as_deref(), Some("abc"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_reports_presence() {
        let store = MemoryStore::new();
        store.set("token", "abc").unwrap();

        assert!(store.remove("token").unwrap());
        assert!(!store.remove("token").unwrap());
        assert!(store.is_empty());
    }
}
