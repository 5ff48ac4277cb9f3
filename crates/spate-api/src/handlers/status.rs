//! /status, /clear and /ping handlers — session inspection and teardown.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use spate_core::meter::MeterSnapshot;

use super::ApiState;

// ── /status/:id (GET) ─────────────────────────────────────────────────────────

pub async fn handle_status(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<MeterSnapshot>, (StatusCode, String)> {
    let meter = state
        .registry
        .resolve(&session_id, false)
        .ok_or((StatusCode::NOT_FOUND, "session not found".to_string()))?;

    Ok(Json(meter.snapshot()))
}

// ── /clear/:id (DELETE) ───────────────────────────────────────────────────────

pub async fn handle_clear(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.registry.remove(&session_id) {
        tracing::info!(session_id = %session_id, "session cleared");
        Ok(StatusCode::OK)
    } else {
        Err((StatusCode::NOT_FOUND, "session not found".to_string()))
    }
}

// ── /ping/:id (GET) ───────────────────────────────────────────────────────────

/// Latency probe. Touches nothing; the id is logged for correlation only.
pub async fn handle_ping(Path(session_id): Path<String>) -> StatusCode {
    tracing::debug!(session_id = %session_id, "ping");
    StatusCode::OK
}
