//! Wire and storage types for ledger transactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A transfer request as submitted by the frontend.
///
/// The struct itself enforces nothing: every field is accepted as-is and
/// checked later by [`super::validate_transaction`]. Keeping the identifiers
/// as strings preserves leading zeros and lets malformed input reach the
/// validator instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Sender account number (10 digits).
    pub from_account_num: String,
    /// Sender institution routing number (9 digits).
    pub from_routing_num: String,
    /// Receiver account number (10 digits).
    pub to_account_num: String,
    /// Receiver institution routing number (9 digits).
    pub to_routing_num: String,
    /// Amount in the smallest currency unit. Signed so that negative
    /// requests are rejected by validation, not by the JSON parser.
    pub amount: i64,
}

impl Transaction {
    /// Whether this transaction originates at the institution identified by
    /// `local_routing_num`.
    pub fn is_from(&self, local_routing_num: &str) -> bool {
        self.from_routing_num == local_routing_num
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} -> {}/{} amount={}",
            self.from_routing_num,
            self.from_account_num,
            self.to_routing_num,
            self.to_account_num,
            self.amount,
        )
    }
}

// ---------------------------------------------------------------------------
// LedgerEntry
// ---------------------------------------------------------------------------

/// A transaction after it has been appended to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Store-assigned identifier. Strictly increasing in insertion order.
    pub transaction_id: u64,
    /// When the entry was written.
    pub timestamp: DateTime<Utc>,
    /// The transaction as it was submitted.
    pub transaction: Transaction,
}
