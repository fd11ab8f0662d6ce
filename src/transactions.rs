use std::sync::Arc;

use log::debug;

use crate::codec::Codec;
use crate::collection::Collection;
use crate::config::LedgerConfig;
use crate::error::Result;
use crate::store::KvStore;
use crate::transaction::Transaction;

/// The append-only trade order collection, stored like the event
/// collection under its own key.
pub struct TransactionLog<S> {
    transactions: Collection<S, Transaction>,
}

impl<S: KvStore> TransactionLog<S> {
    pub fn new(store: Arc<S>, config: &LedgerConfig) -> Self {
        TransactionLog {
            transactions: Collection::new(
                store,
                config.transaction_key.clone(),
                Codec::new(config.naming),
                config.decode_policy,
                config.concurrency,
            ),
        }
    }

    pub fn key(&self) -> &str {
        self.transactions.key()
    }

    /// Append a new transaction. Its `related` list is cleared first; no
    /// operation populates it.
    ///
    /// Like event appends, this rewrites the whole collection.
    pub fn append_transaction(&self, mut transaction: Transaction) -> Result<()> {
        transaction.related.clear();
        let id = transaction.id.clone();
        let len = self.transactions.append(transaction)?;
        debug!("appended transaction '{id}'; {len} transactions stored");
        Ok(())
    }

    /// Every stored transaction, in append order.
    pub fn transactions(&self) -> Result<Vec<Transaction>> {
        self.transactions.load()
    }

    pub(crate) fn reset(&self) -> Result<()> {
        self.transactions.reset()
    }
}
