//! drip-faucet — EVM testnet faucet.
//!
//! Serves a web UI at `/` and a REST API at `/api/request`, dispensing a
//! configurable amount of testnet funds per client every 24 hours. The
//! rate-limit key is the client's forwarded-for address; state lives in
//! process memory and resets on restart.

use std::sync::Arc;

pub mod config;
pub mod rate_limit;
pub mod routes;

use config::Config;
use drip_wallet::Sender;
use rate_limit::RateLimiter;

/// Shared application state passed to every Axum handler.
#[derive(Clone)]
pub struct AppState {
    /// Disbursement collaborator (the operator wallet in production).
    pub sender: Arc<dyn Sender>,
    /// Dispensing gate, created once at startup and never persisted.
    pub rate_limiter: Arc<RateLimiter>,
    /// Faucet configuration.
    pub config: Arc<Config>,
}
