//! # Storage Module
//!
//! Where accepted transactions end up. The intake pipeline only sees the
//! [`TransactionRepository`] trait; [`LedgerDb`] is the on-disk store the
//! service runs with.

pub mod db;

pub use db::{DbError, DbResult, LedgerDb};

use crate::transaction::{LedgerEntry, Transaction};

/// Append-only sink for validated transactions.
#[cfg_attr(test, mockall::automock)]
pub trait TransactionRepository: Send + Sync {
    /// Persists `tx` and returns the stored entry.
    fn save(&self, tx: &Transaction) -> DbResult<LedgerEntry>;
}
