use super::state::AppState;
use crate::error::RecorderError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::{info, warn};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_status(err: &RecorderError) -> StatusCode {
    match err {
        RecorderError::DeviceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        RecorderError::EmptyCapture | RecorderError::ScriptComplete => StatusCode::CONFLICT,
        RecorderError::DecodeFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RecorderError::WaveformWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: RecorderError) -> axum::response::Response {
    warn!("Request failed: {}", err);
    (
        error_status(&err),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /session/take/start
/// Begin recording the current sentence
pub async fn start_take(State(state): State<AppState>) -> impl IntoResponse {
    let mut orchestrator = state.orchestrator.lock().await;

    match orchestrator.begin_take().await {
        Ok(()) => (StatusCode::OK, Json(orchestrator.status())).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /session/take/stop
/// Stop recording; the take is held for preview or export
pub async fn stop_take(State(state): State<AppState>) -> impl IntoResponse {
    let mut orchestrator = state.orchestrator.lock().await;

    let summary = orchestrator.end_take().await;
    (StatusCode::OK, Json(summary)).into_response()
}

/// POST /session/take/export
/// Encode the captured take, emit the WAV file, append the ledger line
pub async fn export_take(State(state): State<AppState>) -> impl IntoResponse {
    let mut orchestrator = state.orchestrator.lock().await;

    match orchestrator.export_take().await {
        Ok(Some(receipt)) => {
            info!("Exported {}", receipt.file_name);
            (StatusCode::OK, Json(receipt)).into_response()
        }
        Ok(None) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "no captured take to export".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /session/take/discard
/// Throw away the captured take and return to idle
pub async fn discard_take(State(state): State<AppState>) -> impl IntoResponse {
    let mut orchestrator = state.orchestrator.lock().await;

    orchestrator.discard_take().await;
    (StatusCode::OK, Json(orchestrator.status())).into_response()
}

/// GET /session/status
/// Session snapshot: state, current sentence, completion ratio
pub async fn session_status(State(state): State<AppState>) -> impl IntoResponse {
    let orchestrator = state.orchestrator.lock().await;
    (StatusCode::OK, Json(orchestrator.status())).into_response()
}

/// GET /session/ledger
/// The serialized ledger, one id|sentence line per exported take
pub async fn get_ledger(State(state): State<AppState>) -> impl IntoResponse {
    let orchestrator = state.orchestrator.lock().await;
    (StatusCode::OK, orchestrator.ledger_text()).into_response()
}

/// DELETE /session/ledger
/// Clear the ledger, in memory and in the store
pub async fn clear_ledger(State(state): State<AppState>) -> impl IntoResponse {
    let mut orchestrator = state.orchestrator.lock().await;

    match orchestrator.clear_ledger() {
        Ok(()) => (StatusCode::OK, Json(orchestrator.status())).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to clear ledger: {}", e),
            }),
        )
            .into_response(),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
