//! Read-modify-write of a whole record collection under one store key.
//!
//! Every append reads the full collection, pushes one record and writes the
//! full collection back, so its cost grows linearly with the history stored
//! under the key.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};

use crate::codec::{Codec, Record};
use crate::config::{Concurrency, DecodePolicy};
use crate::error::{LedgerError, Result};
use crate::store::{ConditionalPutError, KvStore, version_stamp};

/// Collection contents together with the version stamp they were read at.
struct Loaded<T> {
    records: Vec<T>,
    version: String,
}

pub(crate) struct Collection<S, T> {
    store: Arc<S>,
    key: String,
    codec: Codec,
    policy: DecodePolicy,
    concurrency: Concurrency,
    // Admission lock for Concurrency::SingleWriter.
    admission: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<S: KvStore, T: Record> Collection<S, T> {
    pub(crate) fn new(
        store: Arc<S>,
        key: String,
        codec: Codec,
        policy: DecodePolicy,
        concurrency: Concurrency,
    ) -> Self {
        Collection {
            store,
            key,
            codec,
            policy,
            concurrency,
            admission: Mutex::new(()),
            _record: PhantomData,
        }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn codec(&self) -> Codec {
        self.codec
    }

    /// Decode the stored collection. A missing key is an empty collection.
    pub(crate) fn load(&self) -> Result<Vec<T>> {
        Ok(self.read()?.records)
    }

    /// Records matching `keep`, in stored order. Never writes.
    pub(crate) fn select(&self, keep: impl Fn(&T) -> bool) -> Result<Vec<T>> {
        let mut records = self.load()?;
        records.retain(|record| keep(record));
        Ok(records)
    }

    /// Append `record` to the end of the collection and write it back.
    /// Returns the collection length after the append.
    pub(crate) fn append(&self, record: T) -> Result<usize> {
        let _admitted = match self.concurrency {
            Concurrency::SingleWriter => {
                Some(self.admission.lock().unwrap_or_else(PoisonError::into_inner))
            }
            Concurrency::Unguarded | Concurrency::CompareAndSwap => None,
        };

        let Loaded {
            mut records,
            version,
        } = self.read()?;
        records.push(record);

        let bytes = self.codec.encode(&records)?;
        self.write(&version, &bytes)?;
        Ok(records.len())
    }

    /// Replace the collection with an empty one, discarding its history.
    pub(crate) fn reset(&self) -> Result<()> {
        let _admitted = self.admission.lock().unwrap_or_else(PoisonError::into_inner);
        let bytes = self.codec.empty::<T>()?;
        self.store
            .put(&self.key, &bytes)
            .map_err(|source| LedgerError::StoreWrite {
                key: self.key.clone(),
                source,
            })
    }

    fn read(&self) -> Result<Loaded<T>> {
        let bytes = self
            .store
            .get(&self.key)
            .map_err(|source| LedgerError::StoreRead {
                key: self.key.clone(),
                subject: None,
                source,
            })?;
        let version = version_stamp(bytes.as_deref());

        let Some(bytes) = bytes else {
            return Ok(Loaded {
                records: Vec::new(),
                version,
            });
        };

        let records = match self.codec.decode(&bytes) {
            Ok(records) => records,
            Err(source) => match self.policy {
                DecodePolicy::Lenient => {
                    warn!(
                        "collection '{}': {} stored bytes do not decode ({source}), treating as empty",
                        self.key,
                        bytes.len()
                    );
                    Vec::new()
                }
                DecodePolicy::Strict => {
                    return Err(LedgerError::CorruptState {
                        key: self.key.clone(),
                        source,
                    });
                }
            },
        };

        Ok(Loaded { records, version })
    }

    fn write(&self, version: &str, bytes: &[u8]) -> Result<()> {
        match self.concurrency {
            Concurrency::CompareAndSwap => {
                self.store
                    .put_if(&self.key, version, bytes)
                    .map_err(|err| match err {
                        ConditionalPutError::Conflict(conflict) => {
                            debug!("collection '{}': {conflict}", self.key);
                            LedgerError::Conflict {
                                key: conflict.key,
                                expected: conflict.expected,
                                actual: conflict.actual,
                            }
                        }
                        ConditionalPutError::Io(source) => LedgerError::StoreWrite {
                            key: self.key.clone(),
                            source,
                        },
                    })
            }
            Concurrency::Unguarded | Concurrency::SingleWriter => self
                .store
                .put(&self.key, bytes)
                .map_err(|source| LedgerError::StoreWrite {
                    key: self.key.clone(),
                    source,
                }),
        }
    }
}
