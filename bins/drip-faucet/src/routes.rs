//! Axum router and HTTP handlers.

use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use drip_core::{format_ether, Address};

use crate::rate_limit::RateLimiter;
use crate::AppState;

// Embed the web UI at compile time.
const INDEX_HTML: &str = include_str!("static/index.html");

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(web_ui))
        .route("/api/request", post(api_request).fallback(method_not_allowed))
        .route("/api/status", get(api_status))
        .with_state(state)
        .layer(cors)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Serve the embedded web UI.
async fn web_ui() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Any non-POST method on `/api/request`.
async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// `POST /api/request` — dispense funds to the requested address.
///
/// The body is taken as raw bytes so the rate limit is evaluated before
/// the body is even parsed; a flood of garbage requests from one client
/// costs one map lookup each.
async fn api_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let identity = requester_identity(&headers);

    // The claim is dropped (releasing the reservation, preserving quota)
    // on every path except the confirmed-send commit below.
    let claim = match RateLimiter::begin(&state.rate_limiter, &identity, Instant::now()) {
        Ok(claim) => claim,
        Err(retry_after) => {
            info!(%identity, retry_after_secs = retry_after.as_secs(), "Rate limited");
            return rate_limited(retry_after);
        }
    };

    let parsed: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid JSON body."),
    };

    let address: Address = match parsed
        .get("address")
        .and_then(|a| a.as_str())
        .and_then(|s| s.trim().parse().ok())
    {
        Some(addr) => addr,
        None => return error_response(StatusCode::BAD_REQUEST, "Invalid address."),
    };

    info!(%identity, %address, "Faucet request");

    match state.sender.send(address, state.config.amount_wei).await {
        Ok(tx_hash) => {
            claim.commit();
            info!(%tx_hash, %address, "Faucet sent");
            (
                StatusCode::OK,
                Json(json!({"success": true, "txHash": tx_hash})),
            )
                .into_response()
        }
        Err(e) => {
            warn!(error = %e, %address, "Faucet send failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// `GET /api/status` — operator account and faucet parameters.
async fn api_status(State(state): State<AppState>) -> Response {
    let operator = state.sender.address();
    match state.sender.balance().await {
        Ok(balance_wei) => (
            StatusCode::OK,
            Json(json!({
                "operator": operator,
                "balance_eth": format_ether(balance_wei),
                "amount_per_request_eth": state.config.amount_eth(),
                "cooldown_secs": state.config.window_secs,
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({"error": format!("RPC error: {e}")})),
        )
            .into_response(),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The rate-limit key: first comma-separated token of `X-Forwarded-For`,
/// trimmed, or `"unknown"` when the header is absent or empty.
fn requester_identity(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"error": message}))).into_response()
}

fn rate_limited(retry_after: Duration) -> Response {
    let mut response =
        error_response(StatusCode::TOO_MANY_REQUESTS, "Only one request per 24h allowed.");
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after.as_secs()));
    response
}
