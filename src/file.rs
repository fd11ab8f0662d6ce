//! Directory-backed implementation of [`KvStore`].
//!
//! Layout:
//!
//! ```text
//! <dir>/
//!   store.lock        exclusive advisory lock while a FileStore is open
//!   state/
//!     _event_key      one file per key, name escaped
//!     abc
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use fs2::FileExt;

use crate::store::{ConditionalPutError, KvStore, VersionConflict, version_stamp};

/// Controls whether a [`FileStore`] takes the directory lock on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockMode {
    /// Exclusive `flock` on `store.lock`; a second locking open fails.
    #[default]
    Flock,
    /// No process-level lock. Writers in other processes can interleave.
    None,
}

/// Key/value store keeping one file per key in a directory.
///
/// Every write goes to a `.tmp` file first, is synced, then renamed over the
/// final path, so a crash mid-write leaves the previous value intact.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    state_dir: PathBuf,
    // Held for its lock; released on drop.
    _lock: Option<File>,
    // Serializes put_if check-and-write between threads of this process.
    write_guard: Mutex<()>,
}

impl FileStore {
    /// Open or create a store in `dir`, taking the directory lock.
    pub fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
        Self::open_with_lock(dir, LockMode::Flock)
    }

    /// Open or create a store in `dir` with an explicit lock mode.
    pub fn open_with_lock(dir: impl AsRef<Path>, mode: LockMode) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let state_dir = dir.join("state");
        fs::create_dir_all(&state_dir)?;

        let lock = match mode {
            LockMode::Flock => {
                let lock_path = dir.join("store.lock");
                let file = OpenOptions::new()
                    .create(true)
                    .truncate(false)
                    .write(true)
                    .open(&lock_path)?;
                if file.try_lock_exclusive().is_err() {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!(
                            "another writer holds the lock on {}",
                            lock_path.display()
                        ),
                    ));
                }
                Some(file)
            }
            LockMode::None => None,
        };

        Ok(FileStore {
            dir,
            state_dir,
            _lock: lock,
            write_guard: Mutex::new(()),
        })
    }

    /// Returns the store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file path holding `key`.
    pub fn key_path(&self, key: &str) -> PathBuf {
        self.state_dir.join(escape_key(key))
    }

    fn write_atomic(&self, key: &str, value: &[u8]) -> io::Result<()> {
        let path = self.key_path(key);
        let tmp_path = path.with_extension("tmp");

        let written = File::create(&tmp_path).and_then(|mut file| {
            file.write_all(value)?;
            file.sync_data()
        });
        let result = written.and_then(|()| fs::rename(&tmp_path, &path));

        // A failed write leaves the old value in place and no tmp file.
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.key_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> io::Result<()> {
        let _guard = self.write_guard.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_atomic(key, value)
    }

    fn put_if(&self, key: &str, expected: &str, value: &[u8]) -> Result<(), ConditionalPutError> {
        let _guard = self.write_guard.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.get(key)?;
        let actual = version_stamp(current.as_deref());
        if actual != expected {
            return Err(ConditionalPutError::Conflict(VersionConflict {
                key: key.to_string(),
                expected: expected.to_string(),
                actual,
            }));
        }

        self.write_atomic(key, value)?;
        Ok(())
    }
}

/// Map an arbitrary key onto a single safe file name.
///
/// ASCII alphanumerics, `_` and `-` pass through; every other byte becomes
/// `%XX`. The mapping is injective, and never yields `.`-prefixed names or
/// names ending in `.tmp`.
fn escape_key(key: &str) -> String {
    if key.is_empty() {
        return "%".to_string();
    }
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
