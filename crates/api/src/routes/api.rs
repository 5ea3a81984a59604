use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use common::Error;
use engine::{BotStatus, MarketAnalysis, TradeStats};

use crate::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/market/analysis", get(get_market_analysis))
        .route("/api/trades/history", get(get_trade_history))
        .route("/api/tournaments/free", get(get_free_tournaments))
        .route("/api/control", post(post_control))
        .route("/api/settings", post(post_settings))
}

/// Map engine errors onto HTTP responses. Timeouts get their own status so
/// clients can retry; validation is the caller's fault.
fn error_response(e: Error) -> (StatusCode, Json<Value>) {
    let status = match &e {
        Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(json!({ "error": e.to_string(), "retryable": e.is_retryable() })),
    )
}

// ─── Read-only projections ────────────────────────────────────────────────────

async fn get_status(State(state): State<AppState>) -> Json<BotStatus> {
    Json(state.handle.status().await)
}

async fn get_market_analysis(State(state): State<AppState>) -> Json<MarketAnalysis> {
    Json(state.handle.market_analysis().await)
}

async fn get_trade_history(State(state): State<AppState>) -> Json<TradeStats> {
    Json(state.handle.trade_stats().await)
}

async fn get_free_tournaments(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let tournaments = state
        .handle
        .list_free_tournaments()
        .await
        .map_err(error_response)?;
    Ok(Json(json!({ "tournaments": tournaments })))
}

// ─── Control ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ControlRequest {
    action: String,
    id: Option<String>,
}

async fn post_control(
    State(state): State<AppState>,
    Json(body): Json<ControlRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let ok = |message: &str| (StatusCode::OK, Json(json!({ "message": message })));

    match body.action.as_str() {
        "start" => {
            state.handle.start().await.map_err(error_response)?;
            Ok(ok("Bot started. Connection sequence initiated."))
        }
        "stop" => {
            state.handle.stop().await.map_err(error_response)?;
            Ok(ok("Bot stopped."))
        }
        "start_trading" => {
            state
                .handle
                .set_trading_enabled(true)
                .await
                .map_err(error_response)?;
            Ok(ok("Trading activated."))
        }
        "stop_trading" => {
            state
                .handle
                .set_trading_enabled(false)
                .await
                .map_err(error_response)?;
            Ok(ok("Trading deactivated."))
        }
        "join_tournament" => {
            let id = body.id.ok_or_else(|| {
                error_response(Error::Validation("missing tournament id".into()))
            })?;
            let joined = state
                .handle
                .join_tournament(id.clone())
                .await
                .map_err(error_response)?;
            if joined {
                Ok(ok(&format!("Joined tournament {id}.")))
            } else {
                Err((
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "message": format!("Failed to join tournament {id}.") })),
                ))
            }
        }
        other => {
            warn!(action = %other, "Unknown control action");
            Err(error_response(Error::Validation(format!(
                "unknown action: {other}"
            ))))
        }
    }
}

// ─── Settings ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SettingsRequest {
    setting: String,
    value: Value,
}

async fn post_settings(
    State(state): State<AppState>,
    Json(body): Json<SettingsRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let ok = |message: String| (StatusCode::OK, Json(json!({ "message": message })));

    match body.setting.as_str() {
        "min_confidence" => {
            let value = body.value.as_f64().ok_or_else(|| {
                error_response(Error::Validation("min_confidence must be a number".into()))
            })?;
            state
                .handle
                .set_min_confidence(value)
                .await
                .map_err(error_response)?;
            Ok(ok(format!("Min confidence set to {value}")))
        }
        "current_asset" => {
            let asset = body
                .value
                .as_str()
                .ok_or_else(|| {
                    error_response(Error::Validation("current_asset must be a string".into()))
                })?
                .to_string();
            state
                .handle
                .set_active_asset(asset.clone())
                .await
                .map_err(error_response)?;
            Ok(ok(format!("Asset set to {asset}")))
        }
        "current_timeframe" => {
            let secs = body.value.as_u64().and_then(|v| u32::try_from(v).ok()).ok_or_else(
                || error_response(Error::Validation("current_timeframe must be seconds".into())),
            )?;
            state
                .handle
                .set_active_timeframe(secs)
                .await
                .map_err(error_response)?;
            Ok(ok(format!("Timeframe set to {secs}s")))
        }
        other => {
            warn!(setting = %other, "Unknown setting");
            Err(error_response(Error::Validation(format!(
                "unknown setting: {other}"
            ))))
        }
    }
}
