//! Operator key management.
//!
//! The faucet signs every disbursement with a single secp256k1 key loaded
//! from configuration. Key bytes are zeroized after import and never
//! printed; `Debug` redacts the secret.

use std::fmt;

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use zeroize::Zeroize;

use drip_core::Address;

use crate::error::WalletError;

/// The faucet operator's signing key and its derived account address.
pub struct OperatorKey {
    signing_key: SigningKey,
    address: Address,
}

impl OperatorKey {
    /// Import a key from a 64-character hex secret, with or without the
    /// `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, WalletError> {
        let hex_part = s.trim().strip_prefix("0x").unwrap_or(s.trim());
        let mut bytes = hex::decode(hex_part)
            .map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        if bytes.len() != 32 {
            bytes.zeroize();
            return Err(WalletError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }

        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|e| WalletError::InvalidKey(e.to_string()));
        bytes.zeroize();
        let signing_key = signing_key?;

        let address = derive_address(signing_key.verifying_key());
        Ok(Self {
            signing_key,
            address,
        })
    }

    /// The account address controlled by this key.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte digest, returning the signature and recovery id.
    pub fn sign_prehash(&self, digest: &[u8; 32]) -> Result<(Signature, RecoveryId), WalletError> {
        self.signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| WalletError::Signing(e.to_string()))
    }

    /// The verifying (public) key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }
}

impl fmt::Debug for OperatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorKey")
            .field("address", &self.address)
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

/// Derive the account address: Keccak-256 of the uncompressed public key
/// (without the 0x04 tag byte), last 20 bytes.
fn derive_address(verifying_key: &VerifyingKey) -> Address {
    let point = verifying_key.to_encoded_point(false);
    let hash = keccak_hash::keccak(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.0[12..]);
    Address::from_bytes(bytes)
}
