//! # Balance Reader Client
//!
//! Before a locally originated transaction is written, the sender's current
//! balance is fetched from the balance reader service. The request carries
//! the caller's own bearer token, so the balance service applies its own
//! authorization.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::config::BALANCES_PATH;

/// Failure talking to the balance reader.
#[derive(Debug, Error)]
pub enum BalanceError {
    /// Connection refused, DNS failure, timeout, and the like.
    #[error("balance service unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("balance service returned {status}")]
    Status { status: u16 },

    /// The body was not a bare integer.
    #[error("invalid balance response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Looks up an account's available balance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceReader: Send + Sync {
    /// Returns the balance of `account`, authenticating with `token`.
    async fn balance(&self, account: &str, token: &str) -> Result<i64, BalanceError>;
}

/// HTTP client for the balance reader's `GET /balances/{account}` endpoint.
#[derive(Debug, Clone)]
pub struct HttpBalanceClient {
    http_client: reqwest::Client,
    balances_api_uri: String,
}

impl HttpBalanceClient {
    /// Creates a client for the balance reader at `addr` (`host:port`).
    pub fn new(addr: &str, timeout: Duration) -> Result<Self, BalanceError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BalanceError::Transport)?;
        Ok(Self {
            http_client,
            balances_api_uri: format!("http://{}/{}", addr.trim_end_matches('/'), BALANCES_PATH),
        })
    }

    /// Base URI that account numbers are appended to.
    pub fn balances_api_uri(&self) -> &str {
        &self.balances_api_uri
    }
}

#[async_trait]
impl BalanceReader for HttpBalanceClient {
    async fn balance(&self, account: &str, token: &str) -> Result<i64, BalanceError> {
        let uri = format!("{}/{}", self.balances_api_uri, account);
        let response = self
            .http_client
            .get(&uri)
            .bearer_auth(token)
            .send()
            .await
            .map_err(BalanceError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BalanceError::Status {
                status: status.as_u16(),
            });
        }

        response.json::<i64>().await.map_err(BalanceError::Decode)
    }
}
