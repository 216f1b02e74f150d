//! # CLI Interface
//!
//! Command-line arguments for `ledger-writer` using `clap` derive. Every
//! setting can also come from the environment, which is how the service is
//! configured when it runs in a container.

use clap::{Parser, Subcommand};
use ledger_core::config::DEFAULT_BALANCES_TIMEOUT;
use std::path::PathBuf;

/// Ledger writer service.
///
/// Authenticates, validates and records transactions for one bank.
#[derive(Parser, Debug)]
#[command(
    name = "ledger-writer",
    about = "Transaction intake service for the bank ledger",
    version,
    propagate_version = true
)]
pub struct LedgerWriterCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP service.
    Run(RunArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Port for the transaction API.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "METRICS_PORT", default_value_t = 9464)]
    pub metrics_port: u16,

    /// Routing number of this bank. Transactions from this routing number
    /// must come from the authenticated account and are balance-checked.
    #[arg(long, env = "LOCAL_ROUTING_NUM")]
    pub local_routing_num: String,

    /// Address (`host:port`) of the balance reader service.
    #[arg(long, env = "BALANCES_API_ADDR")]
    pub balances_api_addr: String,

    /// Request timeout for the balance reader, in seconds.
    #[arg(
        long,
        env = "BALANCES_TIMEOUT_SECS",
        default_value_t = DEFAULT_BALANCES_TIMEOUT.as_secs()
    )]
    pub balances_timeout_secs: u64,

    /// PEM-encoded RSA public key used to verify bearer tokens.
    #[arg(long, env = "PUB_KEY_PATH")]
    pub pub_key_path: PathBuf,

    /// Version string reported by `GET /version`.
    #[arg(long, env = "VERSION", default_value = env!("CARGO_PKG_VERSION"))]
    pub service_version: String,

    /// Directory holding the ledger database. Created on first run.
    #[arg(long, env = "LEDGER_DATA_DIR", default_value = "./ledger-data")]
    pub data_dir: PathBuf,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}
