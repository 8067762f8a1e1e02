//! # drip-core
//! Value types shared by the Drip faucet: EVM addresses, monetary units,
//! and transaction hashes.

pub mod address;
pub mod constants;
pub mod error;
pub mod tx_hash;
pub mod units;

pub use address::Address;
pub use error::{AddressError, UnitsError};
pub use tx_hash::TxHash;
pub use units::{format_ether, parse_ether};
