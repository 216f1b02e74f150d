// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ledger Core
//!
//! Everything the ledger writer needs to accept a transaction, minus the
//! HTTP plumbing. The binary crate wires these pieces into an axum router;
//! tests wire them into whatever fakes they like.
//!
//! ## Modules
//!
//! - **transaction**: the wire-level `Transaction` and its validation rules.
//! - **auth**: bearer token verification (RS256 JWT).
//! - **balance**: client for the downstream balance reader service.
//! - **storage**: the ledger store transactions are appended to.
//! - **intake**: the submit pipeline: verify, validate, check funds, persist.
//! - **config**: fixed constants shared by the modules above.
//!
//! Collaborators are injected as trait objects so the intake pipeline never
//! knows whether it is talking to sled, reqwest, or a test double.

pub mod auth;
pub mod balance;
pub mod config;
pub mod intake;
pub mod storage;
pub mod transaction;

pub use intake::{IntakeError, TransactionIntake};
pub use transaction::{LedgerEntry, Transaction};
