//! Faucet server entrypoint.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use drip_faucet::config::Config;
use drip_faucet::rate_limit::RateLimiter;
use drip_faucet::{routes, AppState};
use drip_wallet::{OperatorKey, Wallet};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("Failed to load faucet configuration")?;

    let key = OperatorKey::from_hex(&config.private_key)
        .context("PRIVATE_KEY is not a valid secp256k1 secret")?;
    let wallet = Wallet::new(key, &config.rpc_url, config.confirm_timeout())
        .with_context(|| format!("Failed to build RPC client for {}", config.rpc_url))?;

    info!(
        operator = %wallet.address(),
        rpc = %config.rpc_url,
        bind = %config.bind_addr,
        amount_eth = %config.amount_eth(),
        cooldown_secs = config.window_secs,
        "Starting drip-faucet"
    );

    let state = AppState {
        sender: Arc::new(wallet),
        rate_limiter: Arc::new(RateLimiter::new(config.window())),
        config: Arc::new(config.clone()),
    };

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;

    Ok(())
}
