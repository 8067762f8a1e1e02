//! Wallet composition: the [`Sender`] capability backed by a signing key
//! and a node RPC endpoint.
//!
//! A send is: fetch chain id / gas price / pending nonce, build and sign a
//! legacy transfer, broadcast it, then poll for the receipt. The internal
//! send lock is held from nonce fetch through broadcast so that concurrent
//! requests cannot observe the same pending nonce; it is released before
//! confirmation polling, which needs no exclusivity.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use drip_core::constants::TRANSFER_GAS_LIMIT;
use drip_core::{Address, TxHash};

use crate::error::WalletError;
use crate::keys::OperatorKey;
use crate::rpc::RpcClient;
use crate::tx::TransferTx;

/// Default bound on how long a send waits for its receipt.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

/// Receipt polling cadence.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The faucet's view of the ledger client: transfer `amount_wei` to `to`
/// and return the transaction hash once the network has accepted it, plus
/// the operator account introspection the status page shows.
///
/// Implementations must not report success from `send` before the
/// transfer is confirmed on-chain.
#[async_trait]
pub trait Sender: Send + Sync {
    /// The operator account disbursements are drawn from.
    fn address(&self) -> Address;

    /// Operator balance in wei.
    async fn balance(&self) -> Result<u128, WalletError>;

    /// Disburse `amount_wei` to `to`, waiting for confirmation.
    async fn send(&self, to: Address, amount_wei: u128) -> Result<TxHash, WalletError>;
}

/// Operator wallet: signing key plus node RPC access.
#[derive(Debug)]
pub struct Wallet {
    key: OperatorKey,
    rpc: RpcClient,
    confirm_timeout: Duration,
    /// Serializes the nonce-fetch/broadcast window across concurrent sends.
    send_lock: Mutex<()>,
}

impl Wallet {
    pub fn new(
        key: OperatorKey,
        rpc_endpoint: &str,
        confirm_timeout: Duration,
    ) -> Result<Self, WalletError> {
        let rpc = RpcClient::new(rpc_endpoint)?;
        Ok(Self {
            key,
            rpc,
            confirm_timeout,
            send_lock: Mutex::new(()),
        })
    }

    /// The operator account address.
    pub fn address(&self) -> Address {
        self.key.address()
    }

    /// Operator balance in wei at the latest block.
    pub async fn balance(&self) -> Result<u128, WalletError> {
        self.rpc.balance(self.address()).await
    }

    /// Poll until the transaction is mined, reverted, or the confirmation
    /// window elapses.
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<(), WalletError> {
        let deadline = tokio::time::Instant::now() + self.confirm_timeout;
        loop {
            if let Some(receipt) = self.rpc.transaction_receipt(hash).await? {
                // A missing status field (pre-Byzantium chains) counts as
                // success; only an explicit 0 is a revert.
                if receipt.status == Some(0) {
                    return Err(WalletError::Reverted(hash));
                }
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                warn!(%hash, "Receipt did not appear within the confirmation window");
                return Err(WalletError::ConfirmationTimeout {
                    hash,
                    waited_secs: self.confirm_timeout.as_secs(),
                });
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl Sender for Wallet {
    fn address(&self) -> Address {
        Wallet::address(self)
    }

    async fn balance(&self) -> Result<u128, WalletError> {
        Wallet::balance(self).await
    }

    async fn send(&self, to: Address, amount_wei: u128) -> Result<TxHash, WalletError> {
        let guard = self.send_lock.lock().await;

        let chain_id = self.rpc.chain_id().await?;
        let gas_price = self.rpc.gas_price().await?;
        let nonce = self
            .rpc
            .transaction_count(self.address(), "pending")
            .await?;

        let tx = TransferTx {
            nonce,
            gas_price,
            gas_limit: TRANSFER_GAS_LIMIT,
            to,
            value: amount_wei,
        };
        let signed = tx.sign(chain_id, &self.key)?;

        let hash = self.rpc.send_raw_transaction(&signed.raw).await?;
        debug!(%hash, nonce, chain_id, "Broadcast transfer");

        // The pending nonce now reflects this transaction.
        drop(guard);

        self.wait_for_receipt(hash).await?;
        info!(%hash, %to, amount_wei, "Transfer confirmed");
        Ok(hash)
    }
}
