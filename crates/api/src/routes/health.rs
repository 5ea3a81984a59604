use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn health_router() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}

/// Health check endpoint, no auth required.
/// Used by the deploy check and ops scripts.
async fn healthz(State(state): State<AppState>) -> Json<Value> {
    let status = state.handle.status().await;
    Json(json!({
        "status": "ok",
        "bot": status.run_state.to_string(),
        "mode": if status.simulation_mode { "simulation" } else { "live" },
    }))
}
