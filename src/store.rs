use std::fmt;
use std::io;

/// Version stamp of an absent key.
pub const ABSENT: &str = "";

/// Compute the version stamp of a stored value: xxh64 of the raw bytes,
/// hex-encoded. An absent key stamps as [`ABSENT`].
pub fn version_stamp(value: Option<&[u8]>) -> String {
    match value {
        Some(bytes) => format!("{:016x}", xxhash_rust::xxh64::xxh64(bytes, 0)),
        None => ABSENT.to_string(),
    }
}

/// Byte-oriented key/value store the ledger runs on top of.
///
/// A single `put` is atomic. Nothing makes a `get` followed by a `put`
/// atomic; callers that need that use [`KvStore::put_if`].
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`. An absent key is `Ok(None)`.
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing whatever was there.
    fn put(&self, key: &str, value: &[u8]) -> io::Result<()>;

    /// Store `value` under `key` only if the current value still has the
    /// version stamp `expected` (see [`version_stamp`]).
    ///
    /// Check and write happen atomically with respect to every other write
    /// through this store. On a mismatch nothing is written.
    fn put_if(&self, key: &str, expected: &str, value: &[u8]) -> Result<(), ConditionalPutError>;
}

/// Details of a failed [`KvStore::put_if`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConflict {
    pub key: String,
    /// Stamp the caller observed when it read the value.
    pub expected: String,
    /// Stamp of the value actually stored at write time.
    pub actual: String,
}

impl fmt::Display for VersionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version conflict on '{}': expected '{}', found '{}'",
            self.key, self.expected, self.actual
        )
    }
}

/// Error returned by [`KvStore::put_if`].
#[derive(Debug, thiserror::Error)]
pub enum ConditionalPutError {
    #[error("{0}")]
    Conflict(VersionConflict),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Shared stores are stores too, so one `Arc` can back several ledgers.
impl<S: KvStore + ?Sized> KvStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> io::Result<()> {
        (**self).put(key, value)
    }

    fn put_if(&self, key: &str, expected: &str, value: &[u8]) -> Result<(), ConditionalPutError> {
        (**self).put_if(key, expected, value)
    }
}
