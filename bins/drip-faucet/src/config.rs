//! Faucet configuration loaded from environment variables.

use std::time::Duration;

use anyhow::{Context, Result};
use drip_core::{format_ether, parse_ether};

#[derive(Clone, Debug)]
pub struct Config {
    /// Node JSON-RPC endpoint.
    pub rpc_url: String,
    /// Operator signing key, hex-encoded. Required.
    pub private_key: String,
    /// Amount to dispense per request, in wei.
    pub amount_wei: u128,
    /// Address to bind the HTTP server.
    pub bind_addr: String,
    /// Cooldown between disbursements per requester identity, in seconds.
    pub window_secs: u64,
    /// Upper bound on the wait for transaction confirmation, in seconds.
    pub confirm_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let rpc_url =
            std::env::var("RPC_URL").unwrap_or_else(|_| "http://localhost:8545".to_string());

        let private_key = std::env::var("PRIVATE_KEY").context("PRIVATE_KEY is required")?;

        let amount = std::env::var("FAUCET_AMOUNT").unwrap_or_else(|_| "0.1".to_string());
        let amount_wei = parse_ether(&amount)
            .map_err(anyhow::Error::new)
            .context("FAUCET_AMOUNT must be a decimal ether amount")?;

        let bind_addr =
            std::env::var("FAUCET_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let window_secs: u64 = std::env::var("FAUCET_COOLDOWN_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .context("FAUCET_COOLDOWN_SECS must be a positive integer")?;

        let confirm_timeout_secs: u64 = std::env::var("FAUCET_CONFIRM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .context("FAUCET_CONFIRM_TIMEOUT_SECS must be a positive integer")?;

        Ok(Config {
            rpc_url,
            private_key,
            amount_wei,
            bind_addr,
            window_secs,
            confirm_timeout_secs,
        })
    }

    /// The rate-limit window.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// The confirmation wait bound.
    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    /// Amount per request in ether (for display).
    pub fn amount_eth(&self) -> String {
        format_ether(self.amount_wei)
    }
}
