use std::io;

use serde_json::json;

use crate::codec::CodecError;

/// Errors returned by ledger operations.
///
/// Every error reaches the caller as-is; nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Wrong number of arguments, or an argument that does not parse.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The store failed to read `key` (absence is not a failure).
    ///
    /// `subject` is what the caller asked about when that is not the key
    /// itself, such as the car id of a timeline query.
    #[error("failed to read '{key}' from the store: {source}")]
    StoreRead {
        key: String,
        subject: Option<String>,
        #[source]
        source: io::Error,
    },

    /// The store failed to write `key`. Nothing was changed.
    #[error("failed to write '{key}' to the store: {source}")]
    StoreWrite {
        key: String,
        #[source]
        source: io::Error,
    },

    /// A raw read found nothing under `name`.
    #[error("no value stored under '{name}'")]
    NotFound { name: String },

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// Stored collection bytes could not be decoded under the strict
    /// decode policy.
    #[error("stored collection under '{key}' is corrupt: {source}")]
    CorruptState {
        key: String,
        #[source]
        source: CodecError,
    },

    /// A compare-and-swap write found the collection changed since it was
    /// read. Nothing was written; re-issuing the operation is safe.
    #[error("collection '{key}' changed concurrently (expected version '{expected}', found '{actual}')")]
    Conflict {
        key: String,
        expected: String,
        actual: String,
    },

    /// A collection could not be encoded.
    #[error("encoding error: {0}")]
    Codec(#[from] CodecError),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    /// Structured JSON payload describing the error, suitable for handing
    /// back to a remote caller.
    ///
    /// ```
    /// use carledger::LedgerError;
    ///
    /// let err = LedgerError::NotFound { name: "abc".into() };
    /// assert_eq!(err.payload(), r#"{"Error":"Failed to get state for abc"}"#);
    /// ```
    pub fn payload(&self) -> String {
        let message = match self {
            LedgerError::NotFound { name } => format!("Failed to get state for {name}"),
            LedgerError::StoreRead { key, subject, .. } => {
                format!("Failed to get state for {}", subject.as_deref().unwrap_or(key.as_str()))
            }
            other => other.to_string(),
        };
        json!({ "Error": message }).to_string()
    }

    /// Returns `true` if re-issuing the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Conflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound { .. })
    }

    /// Attach the name a query was about to a store read failure, so the
    /// payload reports it instead of the collection key.
    pub(crate) fn about(self, name: &str) -> Self {
        match self {
            LedgerError::StoreRead { key, source, .. } => LedgerError::StoreRead {
                key,
                subject: Some(name.to_string()),
                source,
            },
            other => other,
        }
    }

    pub(crate) fn arity(operation: &str, expected: usize, got: usize) -> Self {
        LedgerError::InvalidArgument(format!(
            "incorrect number of arguments for '{operation}': expected {expected}, got {got}"
        ))
    }
}
