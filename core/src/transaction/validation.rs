//! Transaction validation: identity, format, and business rules.
//!
//! Every submitted transaction passes through [`validate_transaction`]
//! before any downstream call is made. The rules are evaluated in a fixed
//! order and the first failure wins, so callers can rely on which message
//! comes back when several rules are broken at once.

use thiserror::Error;

use super::types::Transaction;
use crate::config::{ACCOUNT_NUMBER_LEN, ROUTING_NUMBER_LEN};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons a transaction can be rejected by validation.
///
/// The display strings are returned verbatim to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A local transaction whose sender is not the authenticated account.
    #[error("sender not authenticated")]
    SenderNotAuthenticated,

    /// An account or routing number is not the expected run of digits.
    #[error("invalid account details")]
    InvalidAccountDetails,

    /// Sender and receiver are the same account at the same institution.
    #[error("can't send to self")]
    SelfTransfer,

    /// The amount is zero or negative.
    #[error("invalid amount")]
    InvalidAmount,
}

// ---------------------------------------------------------------------------
// Identifier predicates
// ---------------------------------------------------------------------------

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// Exactly ten ASCII digits.
pub fn is_account_number(s: &str) -> bool {
    is_digits(s, ACCOUNT_NUMBER_LEN)
}

/// Exactly nine ASCII digits.
pub fn is_routing_number(s: &str) -> bool {
    is_digits(s, ROUTING_NUMBER_LEN)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Checks a transaction against the ledger's acceptance rules.
///
/// The checks, in order:
///
/// 1. **Sender identity**: if the sender banks locally, the sender account
///    must be the authenticated account.
/// 2. **Format**: account numbers are 10 digits, routing numbers 9.
/// 3. **Self-transfer**: sender and receiver must differ in account or
///    routing number.
/// 4. **Amount**: must be > 0.
///
/// # Errors
///
/// Returns the first failing check as a [`ValidationError`].
pub fn validate_transaction(
    local_routing_num: &str,
    authenticated_account: &str,
    tx: &Transaction,
) -> Result<(), ValidationError> {
    if tx.is_from(local_routing_num) && tx.from_account_num != authenticated_account {
        return Err(ValidationError::SenderNotAuthenticated);
    }

    if !is_account_number(&tx.from_account_num)
        || !is_account_number(&tx.to_account_num)
        || !is_routing_number(&tx.from_routing_num)
        || !is_routing_number(&tx.to_routing_num)
    {
        return Err(ValidationError::InvalidAccountDetails);
    }

    if tx.from_account_num == tx.to_account_num && tx.from_routing_num == tx.to_routing_num {
        return Err(ValidationError::SelfTransfer);
    }

    if tx.amount <= 0 {
        return Err(ValidationError::InvalidAmount);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const LOCAL: &str = "123456789";
    const ALICE: &str = "1011226111";
    const BOB: &str = "1033623433";

    fn tx(
        from_acct: &str,
        from_route: &str,
        to_acct: &str,
        to_route: &str,
        amount: i64,
    ) -> Transaction {
        Transaction {
            from_account_num: from_acct.into(),
            from_routing_num: from_route.into(),
            to_account_num: to_acct.into(),
            to_routing_num: to_route.into(),
            amount,
        }
    }

    #[test]
    fn valid_local_transfer_passes() {
        let t = tx(ALICE, LOCAL, BOB, LOCAL, 1_000);
        assert_eq!(validate_transaction(LOCAL, ALICE, &t), Ok(()));
    }

    #[test]
    fn valid_external_transfer_passes_for_any_caller() {
        // Inbound from another bank: the caller does not own the sender.
        let t = tx(ALICE, "987654321", BOB, LOCAL, 1);
        assert_eq!(validate_transaction(LOCAL, "9999999999", &t), Ok(()));
    }

    #[test]
    fn local_sender_must_match_authenticated_account() {
        let t = tx(ALICE, LOCAL, BOB, LOCAL, 100);
        assert_eq!(
            validate_transaction(LOCAL, BOB, &t),
            Err(ValidationError::SenderNotAuthenticated)
        );
    }

    #[test]
    fn sender_check_runs_before_every_other_rule() {
        // Self-transfer with a bad amount, but the caller is someone else.
        let t = tx(ALICE, LOCAL, ALICE, LOCAL, -5);
        assert_eq!(
            validate_transaction(LOCAL, BOB, &t),
            Err(ValidationError::SenderNotAuthenticated)
        );
    }

    #[test]
    fn malformed_identifiers_are_rejected() {
        let cases = [
            tx("101122611", "987654321", BOB, LOCAL, 1),
            tx(ALICE, "98765432", BOB, LOCAL, 1),
            tx(ALICE, "987654321", "10336234330", LOCAL, 1),
            tx(ALICE, "987654321", BOB, "12345678a", 1),
            tx(ALICE, "987654321", BOB, " 23456789", 1),
            tx(ALICE, "98765432\u{0661}", BOB, LOCAL, 1),
            tx("", "987654321", BOB, LOCAL, 1),
        ];
        for t in &cases {
            assert_eq!(
                validate_transaction(LOCAL, ALICE, t),
                Err(ValidationError::InvalidAccountDetails),
                "{t}"
            );
        }
    }

    #[test]
    fn format_check_precedes_self_and_amount_checks() {
        let t = tx("123", "987654321", "123", "987654321", 0);
        assert_eq!(
            validate_transaction(LOCAL, ALICE, &t),
            Err(ValidationError::InvalidAccountDetails)
        );
    }

    #[test]
    fn self_transfer_is_rejected() {
        let t = tx(ALICE, LOCAL, ALICE, LOCAL, 100);
        assert_eq!(
            validate_transaction(LOCAL, ALICE, &t),
            Err(ValidationError::SelfTransfer)
        );
    }

    #[test]
    fn same_account_at_different_bank_is_not_self() {
        let t = tx(ALICE, LOCAL, ALICE, "987654321", 100);
        assert_eq!(validate_transaction(LOCAL, ALICE, &t), Ok(()));
    }

    #[test]
    fn self_transfer_reported_before_bad_amount() {
        let t = tx(ALICE, LOCAL, ALICE, LOCAL, 0);
        assert_eq!(
            validate_transaction(LOCAL, ALICE, &t),
            Err(ValidationError::SelfTransfer)
        );
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        for amount in [0, -1, i64::MIN] {
            let t = tx(ALICE, LOCAL, BOB, LOCAL, amount);
            assert_eq!(
                validate_transaction(LOCAL, ALICE, &t),
                Err(ValidationError::InvalidAmount)
            );
        }
    }

    #[test]
    fn error_messages_match_client_contract() {
        assert_eq!(
            ValidationError::SenderNotAuthenticated.to_string(),
            "sender not authenticated"
        );
        assert_eq!(
            ValidationError::InvalidAccountDetails.to_string(),
            "invalid account details"
        );
        assert_eq!(ValidationError::SelfTransfer.to_string(), "can't send to self");
        assert_eq!(ValidationError::InvalidAmount.to_string(), "invalid amount");
    }

    #[test]
    fn transaction_json_uses_camel_case() {
        let json = r#"{"fromAccountNum":"1011226111","fromRoutingNum":"123456789",
            "toAccountNum":"1033623433","toRoutingNum":"123456789","amount":-20}"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.from_account_num, ALICE);
        assert_eq!(t.amount, -20);
        assert_eq!(validate_transaction(LOCAL, ALICE, &t), Err(ValidationError::InvalidAmount));
    }
}
