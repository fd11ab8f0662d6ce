use serde::{Deserialize, Serialize};

use crate::codec::Naming;
use crate::error::{LedgerError, Result};

pub const DEFAULT_EVENT_KEY: &str = "_event_key";
pub const DEFAULT_TRANSACTION_KEY: &str = "_transaction_key";
pub const DEFAULT_DIAGNOSTIC_KEY: &str = "abc";

/// What to do when the bytes stored under a collection key do not decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Treat unreadable state as an empty collection. An append then
    /// overwrites the unreadable bytes.
    #[default]
    Lenient,
    /// Fail with [`LedgerError::CorruptState`](crate::LedgerError::CorruptState).
    Strict,
}

/// How an append protects its read-modify-write of a collection key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concurrency {
    /// Plain get then put. Two overlapping appends can lose one update;
    /// serialization is left to the environment around the ledger.
    #[default]
    Unguarded,
    /// Appends to the same collection through one ledger are admitted one
    /// at a time.
    SingleWriter,
    /// The write only lands if the collection still has the version stamp
    /// observed on read, otherwise the append fails with
    /// [`LedgerError::Conflict`](crate::LedgerError::Conflict).
    CompareAndSwap,
}

/// Ledger configuration.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use carledger::{Concurrency, LedgerConfig};
///
/// let config: LedgerConfig = serde_json::from_str(r#"{"concurrency":"compare_and_swap"}"#).unwrap();
/// assert_eq!(config.concurrency, Concurrency::CompareAndSwap);
/// assert_eq!(config.event_key, "_event_key");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Store key holding the event collection.
    pub event_key: String,
    /// Store key holding the transaction collection.
    pub transaction_key: String,
    /// Store key `init` writes its integer to.
    pub diagnostic_key: String,
    pub naming: Naming,
    pub decode_policy: DecodePolicy,
    pub concurrency: Concurrency,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            event_key: DEFAULT_EVENT_KEY.to_string(),
            transaction_key: DEFAULT_TRANSACTION_KEY.to_string(),
            diagnostic_key: DEFAULT_DIAGNOSTIC_KEY.to_string(),
            naming: Naming::default(),
            decode_policy: DecodePolicy::default(),
            concurrency: Concurrency::default(),
        }
    }
}

impl LedgerConfig {
    /// Check that the three store keys are pairwise distinct.
    ///
    /// Each collection owns its key outright; two components sharing one key
    /// would overwrite each other's state on every write.
    pub fn validate(&self) -> Result<()> {
        let keys = [
            ("event_key", &self.event_key),
            ("transaction_key", &self.transaction_key),
            ("diagnostic_key", &self.diagnostic_key),
        ];
        for (i, (name, key)) in keys.iter().enumerate() {
            if let Some((other, _)) = keys[i + 1..].iter().find(|(_, k)| k == key) {
                return Err(LedgerError::InvalidArgument(format!(
                    "{name} and {other} must differ, both are '{key}'"
                )));
            }
        }
        Ok(())
    }
}
