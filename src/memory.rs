//! In-memory implementation of [`KvStore`].
//!
//! Nothing is persisted; all data is lost when the store is dropped.

use std::collections::HashMap;
use std::io;
use std::sync::{PoisonError, RwLock};

use crate::store::{ConditionalPutError, KvStore, VersionConflict, version_stamp};

/// In-memory store. Thread-safe via `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no key has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> io::Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn put_if(&self, key: &str, expected: &str, value: &[u8]) -> Result<(), ConditionalPutError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        let actual = version_stamp(entries.get(key).map(Vec::as_slice));
        if actual != expected {
            return Err(ConditionalPutError::Conflict(VersionConflict {
                key: key.to_string(),
                expected: expected.to_string(),
                actual,
            }));
        }

        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ABSENT;

    #[test]
    fn get_absent_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn put_then_get() {
        let store = MemoryStore::new();
        store.put("abc", b"42").unwrap();
        assert_eq!(store.get("abc").unwrap().as_deref(), Some(&b"42"[..]));
        assert_eq!(store.keys(), vec!["abc".to_string()]);
    }

    #[test]
    fn put_if_on_absent_key() {
        let store = MemoryStore::new();
        store.put_if("k", ABSENT, b"v1").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"v1"[..]));
    }

    #[test]
    fn put_if_rejects_stale_stamp() {
        let store = MemoryStore::new();
        store.put("k", b"v1").unwrap();
        let stale = version_stamp(Some(b"v0"));

        let err = store.put_if("k", &stale, b"v2").unwrap_err();
        match err {
            ConditionalPutError::Conflict(conflict) => {
                assert_eq!(conflict.key, "k");
                assert_eq!(conflict.expected, stale);
                assert_eq!(conflict.actual, version_stamp(Some(b"v1")));
            }
            ConditionalPutError::Io(e) => panic!("expected Conflict, got Io: {e}"),
        }
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"v1"[..]));
    }
}
