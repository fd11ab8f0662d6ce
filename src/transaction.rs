use serde::{Deserialize, Serialize};

use crate::codec::Record;

/// One trade/exchange order between two traders.
///
/// Immutable once appended. `related` exists in the stored schema but no
/// operation fills it; new transactions always start with it empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
    pub id: String,
    pub timestamp: String,
    pub trader_a: String,
    pub trader_b: String,
    pub seller_a: String,
    pub seller_b: String,
    pub point_a: String,
    pub point_b: String,
    /// Identifiers of related transactions.
    pub related: Vec<String>,
}

impl Transaction {
    /// Build a transaction from the eight positional arguments of
    /// `append_transaction`, in their fixed order: id, trader_a, trader_b,
    /// seller_a, seller_b, point_a, point_b, timestamp.
    pub fn from_args(
        [id, trader_a, trader_b, seller_a, seller_b, point_a, point_b, timestamp]: [String; 8],
    ) -> Self {
        Transaction {
            id,
            timestamp,
            trader_a,
            trader_b,
            seller_a,
            seller_b,
            point_a,
            point_b,
            related: Vec::new(),
        }
    }
}

impl Record for Transaction {
    const ENVELOPE: (&'static str, &'static str) = ("transactions", "TRANSACTIONS");
    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "TRANSACTION_ID"),
        ("timestamp", "TIMESTAMP"),
        ("trader_a", "TRADER_A"),
        ("trader_b", "TRADER_B"),
        ("seller_a", "SELLER_A"),
        ("seller_b", "SELLER_B"),
        ("point_a", "POINT_A"),
        ("point_b", "POINT_B"),
        ("related", "RELATED"),
    ];
}
