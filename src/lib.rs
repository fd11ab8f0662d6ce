//! Append-only vehicle incident ledger and trade log over a key/value store.
//!
//! Each collection (events, transactions) lives under a single store key as
//! one encoded list. Appends read the whole list, push one record and write
//! the whole list back; queries decode it and filter linearly. The store
//! itself is injected through the [`KvStore`] trait.
//!
//! A get followed by a put is not atomic. With [`Concurrency::Unguarded`]
//! two overlapping appends to one collection can lose an update; choose
//! [`Concurrency::SingleWriter`] or [`Concurrency::CompareAndSwap`] when
//! the surrounding environment does not serialize appends itself.

mod codec;
mod collection;
mod config;
mod dispatch;
mod error;
mod event;
mod events;
mod file;
mod ledger;
mod memory;
mod raw;
mod store;
mod transaction;
mod transactions;

pub use codec::{Codec, CodecError, Naming, Record};
pub use config::{
    Concurrency, DEFAULT_DIAGNOSTIC_KEY, DEFAULT_EVENT_KEY, DEFAULT_TRANSACTION_KEY,
    DecodePolicy, LedgerConfig,
};
pub use dispatch::{Operation, OperationKind};
pub use error::{LedgerError, Result};
pub use event::{Event, IOT_SEPARATOR};
pub use events::EventLedger;
pub use file::{FileStore, LockMode};
pub use ledger::{Ledger, LedgerBuilder};
pub use memory::MemoryStore;
pub use raw::RawKv;
pub use store::{ABSENT, ConditionalPutError, KvStore, VersionConflict, version_stamp};
pub use transaction::Transaction;
pub use transactions::TransactionLog;

/// Ordered events, as stored under the event collection key.
pub type EventCollection = Vec<Event>;

/// Ordered transactions, as stored under the transaction collection key.
pub type TransactionCollection = Vec<Transaction>;
