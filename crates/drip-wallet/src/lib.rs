//! # drip-wallet
//! The disbursement side of the Drip faucet: an operator-controlled key
//! that constructs, signs, broadcasts, and confirms native-currency
//! transfers over a node's JSON-RPC interface.
//!
//! The HTTP layer consumes this crate only through the [`Sender`] trait,
//! so tests (or a future custody backend) can substitute the whole
//! signing-and-broadcast pipeline behind a single seam.

pub mod error;
pub mod keys;
pub mod rpc;
pub mod tx;
pub mod wallet;

pub use error::WalletError;
pub use keys::OperatorKey;
pub use rpc::RpcClient;
pub use wallet::{Sender, Wallet};
