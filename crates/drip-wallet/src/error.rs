//! Wallet error types.

use drip_core::TxHash;
use thiserror::Error;

/// Errors that can occur while constructing, broadcasting, or confirming
/// a disbursement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The operator private key could not be parsed.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// The JSON-RPC transport or the node returned an error.
    #[error("rpc: {0}")]
    Rpc(String),

    /// The node returned a response we could not interpret.
    #[error("invalid rpc response: {0}")]
    InvalidResponse(String),

    /// Signing failed.
    #[error("signing: {0}")]
    Signing(String),

    /// The transaction was mined but reverted.
    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    /// No receipt appeared within the confirmation window.
    #[error("transaction {hash} unconfirmed after {waited_secs}s")]
    ConfirmationTimeout {
        /// Hash of the broadcast transaction.
        hash: TxHash,
        /// How long we waited before giving up.
        waited_secs: u64,
    },
}
