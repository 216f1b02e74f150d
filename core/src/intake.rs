//! # Transaction Intake
//!
//! The submit pipeline behind `POST /transactions`:
//!
//! 1. strip the `Bearer ` prefix and verify the token;
//! 2. validate the transaction against the caller's `acct` claim;
//! 3. for transactions sent from an account at this bank, confirm the
//!    sender can cover the amount;
//! 4. append to the ledger.
//!
//! Each collaborator is called at most once and nothing is retried. The
//! first failure ends the request; the ledger is only touched after every
//! check has passed.

use std::sync::Arc;
use thiserror::Error;

use crate::auth::{strip_bearer, TokenVerifier, VerificationError};
use crate::balance::{BalanceError, BalanceReader};
use crate::config::READINESS_CODE;
use crate::storage::{DbError, TransactionRepository};
use crate::transaction::{validate_transaction, LedgerEntry, Transaction, ValidationError};

/// Why a submission was turned away.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Bad, expired, or malformed bearer token.
    #[error("not authorized: {0}")]
    Unauthorized(#[from] VerificationError),

    /// The transaction broke one of the validation rules.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The sender's balance is lower than the amount.
    #[error("insufficient balance")]
    InsufficientBalance,

    /// The balance reader could not be consulted.
    #[error(transparent)]
    Balance(#[from] BalanceError),

    /// The ledger store rejected the write.
    #[error("failed to record transaction: {0}")]
    Storage(#[from] DbError),
}

impl IntakeError {
    /// Short machine-friendly label, used for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::Invalid(_) => "invalid",
            Self::InsufficientBalance => "insufficient_balance",
            Self::Balance(_) | Self::Storage(_) => "downstream",
        }
    }
}

/// Accepts transactions on behalf of one bank.
///
/// Holds no per-request state, so a single instance behind an `Arc` serves
/// every request concurrently.
pub struct TransactionIntake {
    verifier: Arc<dyn TokenVerifier>,
    balances: Arc<dyn BalanceReader>,
    repository: Arc<dyn TransactionRepository>,
    local_routing_num: String,
    version: String,
}

impl TransactionIntake {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        balances: Arc<dyn BalanceReader>,
        repository: Arc<dyn TransactionRepository>,
        local_routing_num: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            verifier,
            balances,
            repository,
            local_routing_num: local_routing_num.into(),
            version: version.into(),
        }
    }

    /// Configured service version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Readiness probe body. The service is ready as soon as it is serving.
    pub fn readiness(&self) -> &'static str {
        READINESS_CODE
    }

    /// Runs the full submit pipeline for one transaction.
    ///
    /// `authorization` is the raw `Authorization` header value; a missing
    /// header should be passed as `""` and fails verification.
    pub async fn submit(
        &self,
        authorization: &str,
        tx: &Transaction,
    ) -> Result<LedgerEntry, IntakeError> {
        let token = strip_bearer(authorization);

        let claims = self.verifier.verify(token).map_err(|e| {
            tracing::warn!(error = %e, "token verification failed");
            e
        })?;

        if let Err(e) = validate_transaction(&self.local_routing_num, claims.account(), tx) {
            tracing::warn!(
                error = %e,
                acct = claims.account(),
                transaction = %tx,
                "transaction failed validation"
            );
            return Err(e.into());
        }

        if tx.is_from(&self.local_routing_num) {
            self.check_available_balance(token, tx).await?;
        }

        tracing::debug!(transaction = %tx, "submitting transaction");
        let entry = self.repository.save(tx).map_err(|e| {
            tracing::error!(error = %e, transaction = %tx, "failed to persist transaction");
            e
        })?;

        tracing::info!(
            transaction_id = entry.transaction_id,
            from = %tx.from_account_num,
            to = %tx.to_account_num,
            amount = tx.amount,
            "transaction recorded"
        );
        Ok(entry)
    }

    async fn check_available_balance(
        &self,
        token: &str,
        tx: &Transaction,
    ) -> Result<(), IntakeError> {
        let balance = self
            .balances
            .balance(&tx.from_account_num, token)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, acct = %tx.from_account_num, "balance lookup failed");
                e
            })?;

        if balance < tx.amount {
            tracing::warn!(
                acct = %tx.from_account_num,
                balance,
                amount = tx.amount,
                "insufficient balance"
            );
            return Err(IntakeError::InsufficientBalance);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
