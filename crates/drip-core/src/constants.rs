//! Monetary and transaction constants. All on-chain values are in wei
//! (1 ETH = 10^18 wei).

/// Wei per whole ether.
pub const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

/// Wei per gigawei (the customary gas-price unit).
pub const GWEI: u128 = 1_000_000_000;

/// Number of decimal places in one ether.
pub const ETH_DECIMALS: u32 = 18;

/// Intrinsic gas cost of a plain value transfer (no calldata).
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;
