//! JSON-RPC access to the node.
//!
//! Thin typed wrapper over the handful of `eth_*` methods the faucet
//! needs. Quantities arrive as `0x`-prefixed hex strings and are parsed
//! into `u128`/`u64`.

use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};

use drip_core::{Address, TxHash};

use crate::error::WalletError;

/// The subset of a transaction receipt the faucet inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Post-Byzantium execution status (1 = success, 0 = reverted).
    /// Absent on chains that predate the status field.
    pub status: Option<u64>,
    /// Block the transaction was included in.
    pub block_number: Option<u64>,
}

/// HTTP JSON-RPC client for a single node endpoint.
#[derive(Debug)]
pub struct RpcClient {
    client: HttpClient,
}

impl RpcClient {
    pub fn new(endpoint: &str) -> Result<Self, WalletError> {
        let client = HttpClientBuilder::default()
            .build(endpoint)
            .map_err(|e| WalletError::Rpc(e.to_string()))?;
        Ok(Self { client })
    }

    async fn request(
        &self,
        method: &str,
        params: ArrayParams,
    ) -> Result<serde_json::Value, WalletError> {
        self.client
            .request(method, params)
            .await
            .map_err(|e| WalletError::Rpc(e.to_string()))
    }

    /// `eth_chainId`
    pub async fn chain_id(&self) -> Result<u64, WalletError> {
        let v = self.request("eth_chainId", ArrayParams::new()).await?;
        Ok(parse_quantity(&v)? as u64)
    }

    /// `eth_gasPrice`
    pub async fn gas_price(&self) -> Result<u128, WalletError> {
        let v = self.request("eth_gasPrice", ArrayParams::new()).await?;
        parse_quantity(&v)
    }

    /// `eth_getTransactionCount` for `address` at the given block tag
    /// (`"latest"` or `"pending"`).
    pub async fn transaction_count(
        &self,
        address: Address,
        block_tag: &str,
    ) -> Result<u64, WalletError> {
        let mut params = ArrayParams::new();
        params.insert(hex_address(address)).unwrap();
        params.insert(block_tag).unwrap();
        let v = self.request("eth_getTransactionCount", params).await?;
        Ok(parse_quantity(&v)? as u64)
    }

    /// `eth_getBalance` at the latest block, in wei.
    pub async fn balance(&self, address: Address) -> Result<u128, WalletError> {
        let mut params = ArrayParams::new();
        params.insert(hex_address(address)).unwrap();
        params.insert("latest").unwrap();
        let v = self.request("eth_getBalance", params).await?;
        parse_quantity(&v)
    }

    /// `eth_sendRawTransaction`; returns the transaction hash the node
    /// accepted the payload under.
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, WalletError> {
        let mut params = ArrayParams::new();
        params.insert(format!("0x{}", hex::encode(raw))).unwrap();
        let v = self.request("eth_sendRawTransaction", params).await?;
        let s = v
            .as_str()
            .ok_or_else(|| WalletError::InvalidResponse(v.to_string()))?;
        TxHash::decode(s).map_err(|e| WalletError::InvalidResponse(e.to_string()))
    }

    /// `eth_getTransactionReceipt`; `None` until the transaction is mined.
    pub async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<Receipt>, WalletError> {
        let mut params = ArrayParams::new();
        params.insert(hash.to_string()).unwrap();
        let v = self.request("eth_getTransactionReceipt", params).await?;
        if v.is_null() {
            return Ok(None);
        }
        Ok(Some(parse_receipt(&v)?))
    }
}

/// Lowercase `0x`-hex form used in RPC parameters.
fn hex_address(address: Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

/// Parse a JSON-RPC hex quantity (`"0x1b4"`).
fn parse_quantity(v: &serde_json::Value) -> Result<u128, WalletError> {
    let s = v
        .as_str()
        .ok_or_else(|| WalletError::InvalidResponse(v.to_string()))?;
    let hex_part = s.strip_prefix("0x").unwrap_or(s);
    if hex_part.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(hex_part, 16)
        .map_err(|e| WalletError::InvalidResponse(format!("bad quantity {s}: {e}")))
}

fn parse_receipt(v: &serde_json::Value) -> Result<Receipt, WalletError> {
    let field = |name: &str| -> Result<Option<u64>, WalletError> {
        match v.get(name) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(val) => Ok(Some(parse_quantity(val)? as u64)),
        }
    };
    Ok(Receipt {
        status: field("status")?,
        block_number: field("blockNumber")?,
    })
}
