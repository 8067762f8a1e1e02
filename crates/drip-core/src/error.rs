//! Error types for drip-core.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("missing 0x prefix")] MissingPrefix,
    #[error("invalid length: expected 40 hex characters, got {0}")] InvalidLength(usize),
    #[error("invalid character: {0}")] InvalidCharacter(char),
    #[error("checksum mismatch")] ChecksumMismatch,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("empty amount")] Empty,
    #[error("invalid digit: {0}")] InvalidDigit(char),
    #[error("too many decimal places: {0} > 18")] TooManyDecimals(usize),
    #[error("amount overflow")] Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxHashError {
    #[error("invalid length: expected 64 hex characters, got {0}")] InvalidLength(usize),
    #[error("invalid hex: {0}")] InvalidHex(String),
}
