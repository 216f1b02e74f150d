// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ledger Writer
//!
//! Entry point for the `ledger-writer` binary. Parses CLI arguments,
//! initializes logging and metrics, wires the intake pipeline to its
//! collaborators, and serves the HTTP API.
//!
//! Subcommands:
//!
//! - `run`: start the service
//! - `version`: print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

use ledger_core::auth::JwtVerifier;
use ledger_core::balance::HttpBalanceClient;
use ledger_core::storage::LedgerDb;
use ledger_core::transaction::is_routing_number;
use ledger_core::TransactionIntake;

use cli::{Commands, LedgerWriterCli};
use logging::LogFormat;
use metrics::WriterMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = LedgerWriterCli::parse();

    match cli.command {
        Commands::Run(args) => run_service(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the API server and the metrics endpoint.
async fn run_service(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        LogFormat::from_str_lossy(&args.log_format),
        &args.service_version,
    );

    ensure!(
        is_routing_number(&args.local_routing_num),
        "LOCAL_ROUTING_NUM must be 9 digits, got {:?}",
        args.local_routing_num
    );

    tracing::info!(
        port = args.port,
        metrics_port = args.metrics_port,
        local_routing_num = %args.local_routing_num,
        balances_api_addr = %args.balances_api_addr,
        data_dir = %args.data_dir.display(),
        version = %args.service_version,
        "starting ledger-writer"
    );

    // --- Token verification ---
    let verifier = JwtVerifier::from_file(&args.pub_key_path).with_context(|| {
        format!(
            "failed to load token public key from {}",
            args.pub_key_path.display()
        )
    })?;
    tracing::info!(path = %args.pub_key_path.display(), "token public key loaded");

    // --- Balance reader ---
    let balances = HttpBalanceClient::new(
        &args.balances_api_addr,
        Duration::from_secs(args.balances_timeout_secs),
    )
    .context("failed to build balance reader client")?;
    tracing::info!(uri = %balances.balances_api_uri(), "balance reader configured");

    // --- Ledger storage ---
    std::fs::create_dir_all(&args.data_dir).with_context(|| {
        format!("failed to create data directory: {}", args.data_dir.display())
    })?;
    let db = LedgerDb::open(&args.data_dir)
        .with_context(|| format!("failed to open ledger at {}", args.data_dir.display()))?;
    tracing::info!(path = %args.data_dir.display(), entries = db.len(), "ledger opened");

    // --- Metrics ---
    let writer_metrics = Arc::new(WriterMetrics::new().context("failed to register metrics")?);

    // --- Application state ---
    let intake = TransactionIntake::new(
        Arc::new(verifier),
        Arc::new(balances),
        Arc::new(db),
        args.local_routing_num,
        args.service_version,
    );
    let app_state = api::AppState {
        intake: Arc::new(intake),
        metrics: Arc::clone(&writer_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(writer_metrics);
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    tracing::info!("ledger-writer stopped");
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("ledger-writer {}", env!("CARGO_PKG_VERSION"));
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
