//! # REST API
//!
//! Builds the axum router for the ledger writer. Handlers share state
//! through axum's `State` extractor; all response bodies are plain text.
//!
//! ## Endpoints
//!
//! | Method | Path            | Description                          |
//! |--------|-----------------|--------------------------------------|
//! | GET    | `/version`      | Configured service version           |
//! | GET    | `/ready`        | Readiness probe                      |
//! | POST   | `/transactions` | Submit a transaction to the ledger   |
//!
//! ## Status codes for `POST /transactions`
//!
//! | Outcome                               | Status | Body                 |
//! |---------------------------------------|--------|----------------------|
//! | recorded                              | 201    | `ok`                 |
//! | token rejected                        | 401    | `not authorized`     |
//! | validation failed / insufficient funds| 400    | rule message         |
//! | body is not a transaction             | 400    | parser message       |
//! | balance reader or ledger store failed | 500    | error description    |

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use ledger_core::config::{CREATED_CODE, UNAUTHORIZED_MESSAGE};
use ledger_core::{IntakeError, Transaction, TransactionIntake};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The submit pipeline and its collaborators.
    pub intake: Arc<TransactionIntake>,
    /// Prometheus handles for in-handler recording.
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the axum [`Router`] with all API routes and request tracing.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/version", get(version_handler))
        .route("/ready", get(readiness_handler))
        .route("/transactions", post(add_transaction_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /version`
async fn version_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, state.intake.version().to_string())
}

/// `GET /ready`: 200 as soon as the server is accepting requests.
async fn readiness_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, state.intake.readiness())
}

/// `POST /transactions`: authenticate, validate, and record a transaction.
///
/// A missing `Authorization` header is treated as an empty token and fails
/// verification like any other bad token.
async fn add_transaction_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Transaction>, JsonRejection>,
) -> Response {
    let Json(tx) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "unreadable transaction body");
            state.metrics.record_rejection("invalid");
            return (StatusCode::BAD_REQUEST, rejection.body_text()).into_response();
        }
    };

    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let timer = state.metrics.submit_latency_seconds.start_timer();
    let result = state.intake.submit(authorization, &tx).await;
    timer.observe_duration();

    match result {
        Ok(_) => {
            state.metrics.transactions_submitted_total.inc();
            (StatusCode::CREATED, CREATED_CODE).into_response()
        }
        Err(err) => {
            state.metrics.record_rejection(err.reason());
            error_response(&err)
        }
    }
}

/// Maps an intake failure onto its HTTP status and body.
fn error_response(err: &IntakeError) -> Response {
    match err {
        IntakeError::Unauthorized(_) => {
            (StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE).into_response()
        }
        IntakeError::Invalid(_) | IntakeError::InsufficientBalance => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        IntakeError::Balance(_) | IntakeError::Storage(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
