//! # Structured Logging
//!
//! Tracing setup for the ledger writer. Pipeline events come from
//! `ledger_core` (rejections at `warn`, downstream failures at `error`,
//! recorded transactions at `info`) and request spans from `tower_http`.
//! Output goes to stderr so stdout stays free for `version`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_FILTER: &str = "ledger_writer=info,ledger_core=info,tower_http=info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, colored output. Suitable for local development.
    Pretty,
    /// Machine-parseable JSON lines. Suitable for production log aggregation.
    Json,
}

impl LogFormat {
    /// Parse a format string. Accepts "json" or "pretty" (case-insensitive).
    /// Returns `Pretty` for any unrecognized value.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Builds the event filter from a `RUST_LOG`-style directive, falling back
/// to [`DEFAULT_FILTER`].
///
/// ```text
/// RUST_LOG=ledger_writer=debug,ledger_core=debug,tower_http=info
/// ```
fn build_filter(directive: Option<&str>) -> EnvFilter {
    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global tracing subscriber.
///
/// Call once, before anything logs. A second call panics.
pub fn init_logging(format: LogFormat, service_version: &str) {
    let directive = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = build_filter(directive.as_deref());

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
                .init();
        }
    }

    tracing::info!(?format, version = service_version, "ledger-writer logging initialized");
}
