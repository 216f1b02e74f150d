//! # LedgerDb: Embedded Ledger Store
//!
//! Append-only transaction store built on sled.
//!
//! ## Tree Layout
//!
//! | Tree           | Key                  | Value                  |
//! |----------------|----------------------|------------------------|
//! | `transactions` | `id` (8B BE)         | `bincode(LedgerEntry)` |
//!
//! Ids come from sled's `generate_id`, which is monotonic across restarts.
//! Storing them big-endian makes sled's lexicographic order match insertion
//! order, so iterating the tree replays the ledger.

use chrono::Utc;
use sled::{Db, Tree};
use std::path::Path;

use super::TransactionRepository;
use crate::transaction::{LedgerEntry, Transaction};

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type DbResult<T> = Result<T, DbError>;

// ---------------------------------------------------------------------------
// LedgerDb
// ---------------------------------------------------------------------------

/// sled-backed [`TransactionRepository`].
///
/// Cheap to clone; clones share the same underlying database. sled handles
/// its own synchronization, so a `LedgerDb` can sit behind an `Arc` and be
/// written from every request handler at once.
#[derive(Debug, Clone)]
pub struct LedgerDb {
    db: Db,
    transactions: Tree,
}

impl LedgerDb {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary database that is removed when dropped.
    pub fn open_temporary() -> DbResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        let transactions = db.open_tree("transactions")?;
        Ok(Self { db, transactions })
    }

    /// Append a transaction, assigning it an id and timestamp.
    ///
    /// The write is flushed before returning.
    pub fn append(&self, tx: &Transaction) -> DbResult<LedgerEntry> {
        let entry = LedgerEntry {
            transaction_id: self.db.generate_id()?,
            timestamp: Utc::now(),
            transaction: tx.clone(),
        };
        let bytes =
            bincode::serialize(&entry).map_err(|e| DbError::Serialization(e.to_string()))?;
        self.transactions
            .insert(entry.transaction_id.to_be_bytes(), bytes)?;
        self.db.flush()?;
        Ok(entry)
    }

    /// Retrieve an entry by id.
    pub fn get(&self, transaction_id: u64) -> DbResult<Option<LedgerEntry>> {
        match self.transactions.get(transaction_id.to_be_bytes())? {
            Some(bytes) => Ok(Some(decode_entry(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> DbResult<Vec<LedgerEntry>> {
        self.transactions
            .iter()
            .map(|item| {
                let (_key, value) = item?;
                decode_entry(&value)
            })
            .collect()
    }

    /// Number of stored transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

fn decode_entry(bytes: &[u8]) -> DbResult<LedgerEntry> {
    bincode::deserialize(bytes).map_err(|e| DbError::Serialization(e.to_string()))
}

impl TransactionRepository for LedgerDb {
    fn save(&self, tx: &Transaction) -> DbResult<LedgerEntry> {
        self.append(tx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
