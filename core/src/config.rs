//! # Constants
//!
//! Fixed values shared across the ledger writer. Deployment-specific values
//! (routing number, balance service address, key path) are not here; they
//! arrive through the binary's CLI/environment layer.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Identifier Formats
// ---------------------------------------------------------------------------

/// Account numbers are exactly ten ASCII digits.
pub const ACCOUNT_NUMBER_LEN: usize = 10;

/// Routing numbers are exactly nine ASCII digits.
pub const ROUTING_NUMBER_LEN: usize = 9;

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Body returned by the readiness probe.
pub const READINESS_CODE: &str = "ok";

/// Body returned when a transaction has been recorded.
pub const CREATED_CODE: &str = "ok";

/// Body returned for any token verification failure. Details stay in the logs.
pub const UNAUTHORIZED_MESSAGE: &str = "not authorized";

/// Scheme prefix on the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Path segment appended to the balance reader address.
pub const BALANCES_PATH: &str = "balances";

/// Request timeout for the balance reader when none is configured.
pub const DEFAULT_BALANCES_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Tokens are issued by the user service with RS256. Nothing else is accepted.
pub const TOKEN_ALGORITHM: jsonwebtoken::Algorithm = jsonwebtoken::Algorithm::RS256;
