//! Legacy transfer construction and EIP-155 signing.
//!
//! The faucet only ever sends plain value transfers, so the whole
//! transaction model is the six legacy fields with empty calldata. The
//! signing payload follows [EIP-155]: the RLP list is extended with
//! `(chain_id, 0, 0)` and the recovery id is folded into
//! `v = chain_id * 2 + 35 + recovery_id`, binding the signature to one
//! chain.
//!
//! RLP integers must be minimal big-endian (no leading zero bytes); the
//! `append_uint` helper below guarantees that for the 128-bit fields and
//! the signature scalars.
//!
//! [EIP-155]: https://eips.ethereum.org/EIPS/eip-155

use rlp::RlpStream;

use drip_core::{Address, TxHash};

use crate::error::WalletError;
use crate::keys::OperatorKey;

/// An unsigned native-currency transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTx {
    /// Sender account nonce.
    pub nonce: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    /// Gas limit (21 000 for a plain transfer).
    pub gas_limit: u64,
    /// Recipient.
    pub to: Address,
    /// Transfer value in wei.
    pub value: u128,
}

/// A signed transfer ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
    /// RLP-encoded signed transaction bytes.
    pub raw: Vec<u8>,
    /// Transaction hash (Keccak-256 of `raw`).
    pub hash: TxHash,
}

impl TransferTx {
    /// RLP-encode the EIP-155 signing payload
    /// `(nonce, gas_price, gas_limit, to, value, "", chain_id, 0, 0)`.
    pub fn signing_rlp(&self, chain_id: u64) -> Vec<u8> {
        let mut stream = RlpStream::new();
        stream.begin_list(9);
        stream.append(&self.nonce);
        append_uint(&mut stream, self.gas_price);
        stream.append(&self.gas_limit);
        stream.append(&self.to.as_bytes().to_vec());
        append_uint(&mut stream, self.value);
        stream.append(&Vec::<u8>::new());
        stream.append(&chain_id);
        stream.append(&0u8);
        stream.append(&0u8);
        stream.out().to_vec()
    }

    /// Keccak-256 of the signing payload.
    pub fn signing_hash(&self, chain_id: u64) -> [u8; 32] {
        keccak_hash::keccak(self.signing_rlp(chain_id)).0
    }

    /// Sign for `chain_id` and encode the broadcast form.
    pub fn sign(&self, chain_id: u64, key: &OperatorKey) -> Result<SignedTransfer, WalletError> {
        let digest = self.signing_hash(chain_id);
        let (signature, recovery_id) = key.sign_prehash(&digest)?;

        let v = chain_id * 2 + 35 + u64::from(recovery_id.to_byte());
        let r: [u8; 32] = signature.r().to_bytes().into();
        let s: [u8; 32] = signature.s().to_bytes().into();

        let mut stream = RlpStream::new();
        stream.begin_list(9);
        stream.append(&self.nonce);
        append_uint(&mut stream, self.gas_price);
        stream.append(&self.gas_limit);
        stream.append(&self.to.as_bytes().to_vec());
        append_uint(&mut stream, self.value);
        stream.append(&Vec::<u8>::new());
        stream.append(&v);
        stream.append(&trim_leading_zeros(&r).to_vec());
        stream.append(&trim_leading_zeros(&s).to_vec());

        let raw = stream.out().to_vec();
        let hash = TxHash::from_bytes(keccak_hash::keccak(&raw).0);
        Ok(SignedTransfer { raw, hash })
    }
}

/// Append a 128-bit quantity as a minimal big-endian RLP integer.
fn append_uint(stream: &mut RlpStream, value: u128) {
    let bytes = value.to_be_bytes();
    stream.append(&trim_leading_zeros(&bytes).to_vec());
}

/// Strip leading zero bytes; zero becomes the empty slice (RLP `0x80`).
fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}
