//! Health probe

use crate::api::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// GET /health
///
/// Always 200; workstation connectivity is reported in the body so
/// monitoring can distinguish "bridge up" from "workstation reachable".
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let client = state.client.lock().await;
    Json(json!({
        "status": "ok",
        "protools_connected": client.is_ready(),
        "session_id": client.session_id(),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}
