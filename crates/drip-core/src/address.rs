//! EVM account addresses.
//!
//! An address is the last 20 bytes of the Keccak-256 hash of the account's
//! uncompressed public key. The canonical text form is `0x` followed by
//! 40 hex characters with the mixed-case checksum from [EIP-55]: the case
//! of each hex letter encodes one bit of the Keccak-256 hash of the
//! lowercase hex string, so single-character typos are detected with high
//! probability.
//!
//! Parsing accepts an all-lowercase form without verification; any
//! uppercase letter makes the checksum mandatory.
//!
//! [EIP-55]: https://eips.ethereum.org/EIPS/eip-55

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;

/// A 20-byte EVM account address.
///
/// Human-readable form is `0x` + 40 hex characters, EIP-55 checksummed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (20 zero bytes). Not a spendable account.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Create an address from a byte array.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Check if this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Encode this address as an EIP-55 checksummed string (`0x`-prefixed).
    pub fn checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak_hash::keccak(lower.as_bytes());

        let mut result = String::with_capacity(42);
        result.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            if c.is_ascii_alphabetic() && checksum_nibble(&hash.0, i) >= 8 {
                result.push(c.to_ascii_uppercase());
            } else {
                result.push(c);
            }
        }
        result
    }

    /// Decode an address string.
    ///
    /// Requires the `0x` prefix and exactly 40 hex characters. All-lowercase
    /// input is accepted as-is; input containing any uppercase hex letter
    /// must match its EIP-55 checksum form exactly.
    pub fn decode(s: &str) -> Result<Self, AddressError> {
        let hex_part = s.strip_prefix("0x").ok_or(AddressError::MissingPrefix)?;

        if hex_part.len() != 40 {
            return Err(AddressError::InvalidLength(hex_part.len()));
        }

        let mut bytes = [0u8; 20];
        for (i, c) in hex_part.chars().enumerate() {
            let nibble = c.to_digit(16).ok_or(AddressError::InvalidCharacter(c))? as u8;
            if i % 2 == 0 {
                bytes[i / 2] = nibble << 4;
            } else {
                bytes[i / 2] |= nibble;
            }
        }

        let address = Self(bytes);

        // Checksum is only enforced when the caller opted into it by using
        // uppercase anywhere in the hex part.
        if hex_part.chars().any(|c| c.is_ascii_uppercase()) {
            let expected = address.checksum();
            if expected[2..] != *hex_part {
                return Err(AddressError::ChecksumMismatch);
            }
        }

        Ok(address)
    }
}

/// The `i`-th nibble of a 32-byte hash, most significant first.
fn checksum_nibble(hash: &[u8; 32], i: usize) -> u8 {
    if i % 2 == 0 {
        hash[i / 2] >> 4
    } else {
        hash[i / 2] & 0x0f
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.checksum())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}
