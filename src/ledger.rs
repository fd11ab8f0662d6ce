use std::sync::Arc;

use log::info;

use crate::codec::Naming;
use crate::config::{Concurrency, DecodePolicy, LedgerConfig};
use crate::error::{LedgerError, Result};
use crate::event::Event;
use crate::events::EventLedger;
use crate::raw::RawKv;
use crate::store::KvStore;
use crate::transaction::Transaction;
use crate::transactions::TransactionLog;

/// The event ledger, transaction log and raw scalar access over one shared
/// store.
///
/// # Examples
///
/// ```
/// use carledger::{Event, Ledger, MemoryStore};
///
/// let ledger = Ledger::new(MemoryStore::new());
/// ledger.init("0").unwrap();
/// ledger
///     .append_event(Event::new("e1", "car1").with_iot("dev1|dev2"))
///     .unwrap();
///
/// let events = ledger.events().query_by_car("car1").unwrap();
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].iot, "dev1|dev2");
/// ```
pub struct Ledger<S> {
    store: Arc<S>,
    config: LedgerConfig,
    events: EventLedger<S>,
    transactions: TransactionLog<S>,
    raw: RawKv<S>,
}

impl<S: KvStore> Ledger<S> {
    /// Create a ledger over `store` with the default configuration.
    pub fn new(store: S) -> Self {
        Self::assemble(Arc::new(store), LedgerConfig::default())
    }

    /// Create a builder for configuring the ledger.
    pub fn builder(store: S) -> LedgerBuilder<S> {
        LedgerBuilder {
            store: Arc::new(store),
            config: LedgerConfig::default(),
        }
    }

    fn assemble(store: Arc<S>, config: LedgerConfig) -> Self {
        Ledger {
            events: EventLedger::new(Arc::clone(&store), &config),
            transactions: TransactionLog::new(Arc::clone(&store), &config),
            raw: RawKv::new(Arc::clone(&store)),
            store,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn events(&self) -> &EventLedger<S> {
        &self.events
    }

    pub fn transactions(&self) -> &TransactionLog<S> {
        &self.transactions
    }

    pub fn raw(&self) -> &RawKv<S> {
        &self.raw
    }

    /// Reset the ledger.
    ///
    /// `value` must parse as an integer; it is written as decimal text under
    /// the diagnostic key. Both collections are then replaced by empty ones,
    /// discarding all recorded events and transactions. Calling it again is
    /// harmless and resets again.
    pub fn init(&self, value: &str) -> Result<()> {
        let number: i64 = value.parse().map_err(|_| {
            LedgerError::InvalidArgument(format!("expected an integer value, got '{value}'"))
        })?;

        self.raw
            .write(&self.config.diagnostic_key, number.to_string().as_bytes())?;
        self.events.reset()?;
        self.transactions.reset()?;

        info!(
            "ledger reset: '{}' = {number}, '{}' and '{}' emptied",
            self.config.diagnostic_key,
            self.events.key(),
            self.transactions.key()
        );
        Ok(())
    }

    /// Shorthand for [`EventLedger::append_event`].
    pub fn append_event(&self, event: Event) -> Result<()> {
        self.events.append_event(event)
    }

    /// Shorthand for [`TransactionLog::append_transaction`].
    pub fn append_transaction(&self, transaction: Transaction) -> Result<()> {
        self.transactions.append_transaction(transaction)
    }
}

/// Builder for configuring a [`Ledger`].
///
/// Created via [`Ledger::builder`]. Settings not touched keep their
/// [`LedgerConfig`] defaults.
///
/// ```
/// use carledger::{Concurrency, DecodePolicy, Ledger, MemoryStore, Naming};
///
/// let ledger = Ledger::builder(MemoryStore::new())
///     .naming(Naming::Tagged)
///     .decode_policy(DecodePolicy::Strict)
///     .concurrency(Concurrency::CompareAndSwap)
///     .build()
///     .unwrap();
/// assert_eq!(ledger.config().naming, Naming::Tagged);
///
/// // Every component needs a key of its own.
/// let shared = Ledger::builder(MemoryStore::new())
///     .transaction_key("_event_key")
///     .build();
/// assert!(shared.is_err());
/// ```
pub struct LedgerBuilder<S> {
    store: Arc<S>,
    config: LedgerConfig,
}

impl<S: KvStore> LedgerBuilder<S> {
    /// Replace the whole configuration.
    pub fn config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn event_key(mut self, key: impl Into<String>) -> Self {
        self.config.event_key = key.into();
        self
    }

    pub fn transaction_key(mut self, key: impl Into<String>) -> Self {
        self.config.transaction_key = key.into();
        self
    }

    pub fn diagnostic_key(mut self, key: impl Into<String>) -> Self {
        self.config.diagnostic_key = key.into();
        self
    }

    pub fn naming(mut self, naming: Naming) -> Self {
        self.config.naming = naming;
        self
    }

    pub fn decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.config.decode_policy = policy;
        self
    }

    pub fn concurrency(mut self, concurrency: Concurrency) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Build the ledger.
    ///
    /// Fails with [`LedgerError::InvalidArgument`] when two of the event,
    /// transaction and diagnostic keys are equal.
    pub fn build(self) -> Result<Ledger<S>> {
        self.config.validate()?;
        Ok(Ledger::assemble(self.store, self.config))
    }
}
