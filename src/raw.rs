use std::sync::Arc;

use crate::error::{LedgerError, Result};
use crate::store::KvStore;

/// Pass-through access to single scalar values, for diagnostics and
/// bootstrap. No collection semantics: bytes go in and come out verbatim.
pub struct RawKv<S> {
    store: Arc<S>,
}

impl<S: KvStore> RawKv<S> {
    pub fn new(store: Arc<S>) -> Self {
        RawKv { store }
    }

    /// Store `value` under `name`, replacing any previous value.
    pub fn write(&self, name: &str, value: &[u8]) -> Result<()> {
        self.store
            .put(name, value)
            .map_err(|source| LedgerError::StoreWrite {
                key: name.to_string(),
                source,
            })
    }

    /// The bytes stored under `name`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] when nothing is stored under `name`;
    /// [`LedgerError::StoreRead`] when the store fails.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let value = self
            .store
            .get(name)
            .map_err(|source| LedgerError::StoreRead {
                key: name.to_string(),
                subject: None,
                source,
            })?;
        value.ok_or_else(|| LedgerError::NotFound {
            name: name.to_string(),
        })
    }
}
