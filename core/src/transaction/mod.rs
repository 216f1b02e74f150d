//! # Transaction Module
//!
//! The transfer request accepted by the ledger writer and the rules it must
//! satisfy before it may be written to the ledger.
//!
//! ```text
//! types.rs       Transaction (wire format) and LedgerEntry (stored form)
//! validation.rs  ordered acceptance rules and identifier predicates
//! ```

pub mod types;
pub mod validation;

pub use types::{LedgerEntry, Transaction};
pub use validation::{
    is_account_number, is_routing_number, validate_transaction, ValidationError,
};
