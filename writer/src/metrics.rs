//! # Prometheus Metrics
//!
//! Counters and latency for the transaction intake path, served at
//! `/metrics` on the metrics port. Everything is registered in a dedicated
//! [`prometheus::Registry`] with the `ledgerwriter` prefix.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Metric handles for the service.
#[derive(Clone)]
pub struct WriterMetrics {
    registry: Registry,
    /// Transactions accepted and written to the ledger.
    pub transactions_submitted_total: IntCounter,
    /// Transactions turned away, labelled by `reason`.
    pub transactions_rejected_total: IntCounterVec,
    /// Time spent in the submit pipeline, including downstream calls.
    pub submit_latency_seconds: Histogram,
}

impl WriterMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("ledgerwriter".into()), None)?;

        let transactions_submitted_total = IntCounter::new(
            "transactions_submitted_total",
            "Total number of transactions written to the ledger",
        )?;
        registry.register(Box::new(transactions_submitted_total.clone()))?;

        let transactions_rejected_total = IntCounterVec::new(
            Opts::new(
                "transactions_rejected_total",
                "Total number of rejected transaction submissions",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(transactions_rejected_total.clone()))?;

        let submit_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "submit_latency_seconds",
                "Transaction submit latency in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;
        registry.register(Box::new(submit_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            transactions_submitted_total,
            transactions_rejected_total,
            submit_latency_seconds,
        })
    }

    /// Records a rejected submission.
    pub fn record_rejection(&self, reason: &str) {
        self.transactions_rejected_total
            .with_label_values(&[reason])
            .inc();
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<WriterMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_prefixed_counters() {
        let metrics = WriterMetrics::new().unwrap();
        metrics.transactions_submitted_total.inc();
        metrics.record_rejection("invalid");
        metrics.record_rejection("invalid");

        let text = metrics.encode().unwrap();
        assert!(text.contains("ledgerwriter_transactions_submitted_total 1"));
        assert!(text.contains("ledgerwriter_transactions_rejected_total{reason=\"invalid\"} 2"));
    }
}
