//! Transfer construction, signing, and wire encoding.
//!
//! A [`Transfer`] is the unsigned payload: recipient, value, nonce, and
//! optional gas parameters. Its txid is the BLAKE3 hash of the bincode
//! encoding, and the detached ed25519 signature is made over that txid,
//! so signatures commit to every field.

use serde::{Deserialize, Serialize};

use crate::address::Network;
use crate::crypto::{KeyPair, PublicKey};
use crate::error::TransferError;
use crate::types::Hash256;

/// Current transfer format version.
pub const TRANSFER_VERSION: u8 = 1;

/// An unsigned value transfer.
///
/// Gas parameters are optional: fee fields are attached when the node
/// reports them, and the gas limit when estimation succeeds. A transfer
/// without them is still broadcastable; the node applies its own
/// defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize,
    bincode::Encode, bincode::Decode)]
pub struct Transfer {
    /// Format version, currently [`TRANSFER_VERSION`].
    pub version: u8,
    /// Network this transfer is valid on.
    pub network: Network,
    /// Sender's account nonce.
    pub nonce: u64,
    /// Recipient pubkey hash.
    pub to: Hash256,
    /// Amount in gills.
    pub value: u64,
    /// Gas limit, when estimation succeeded or the user overrode it.
    pub gas_limit: Option<u64>,
    /// Fee ceiling per gas unit, when the node reported fee info.
    pub max_fee_per_gas: Option<u64>,
    /// Priority tip per gas unit, when the node reported fee info.
    pub priority_fee_per_gas: Option<u64>,
}

impl Transfer {
    /// Build a transfer with no gas parameters attached.
    pub fn new(network: Network, nonce: u64, to: Hash256, value: u64) -> Self {
        Self {
            version: TRANSFER_VERSION,
            network,
            nonce,
            to,
            value,
            gas_limit: None,
            max_fee_per_gas: None,
            priority_fee_per_gas: None,
        }
    }

    /// Structural validation independent of chain state.
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.value == 0 {
            return Err(TransferError::ZeroValue);
        }
        Ok(())
    }

    /// Transfer ID: BLAKE3 hash of the bincode encoding.
    ///
    /// Uses bincode with standard config for deterministic serialization.
    pub fn txid(&self) -> Result<Hash256, TransferError> {
        let encoded = bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| TransferError::Serialization(e.to_string()))?;
        Ok(Hash256(blake3::hash(&encoded).into()))
    }

    /// Hex-encode the unsigned wire form, as passed to gas estimation.
    pub fn encode_hex(&self) -> Result<String, TransferError> {
        let encoded = bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| TransferError::Serialization(e.to_string()))?;
        Ok(hex::encode(encoded))
    }
}

/// A transfer with its sender's public key and detached signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize,
    bincode::Encode, bincode::Decode)]
pub struct SignedTransfer {
    /// The signed payload.
    pub transfer: Transfer,
    /// Sender's 32-byte ed25519 public key.
    pub public_key: Vec<u8>,
    /// 64-byte ed25519 signature over the txid.
    pub signature: Vec<u8>,
}

impl SignedTransfer {
    /// Sign a transfer with the sender's keypair.
    pub fn sign(transfer: Transfer, keypair: &KeyPair) -> Result<Self, TransferError> {
        transfer.validate()?;
        let txid = transfer.txid()?;
        let signature = keypair.sign(txid.as_bytes());
        Ok(Self {
            transfer,
            public_key: keypair.public_key().to_bytes().to_vec(),
            signature,
        })
    }

    /// Verify the signature and structural validity.
    pub fn verify(&self) -> Result<(), TransferError> {
        self.transfer.validate()?;
        let pk = PublicKey::from_bytes(&self.public_key)?;
        let txid = self.transfer.txid()?;
        pk.verify(txid.as_bytes(), &self.signature)?;
        Ok(())
    }

    /// The sender's pubkey hash, as derived from the embedded key.
    pub fn sender_pubkey_hash(&self) -> Result<Hash256, TransferError> {
        Ok(PublicKey::from_bytes(&self.public_key)?.pubkey_hash())
    }

    /// Hex-encode the bincode wire form, as submitted to the node.
    pub fn encode_hex(&self) -> Result<String, TransferError> {
        let encoded = bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| TransferError::Serialization(e.to_string()))?;
        Ok(hex::encode(encoded))
    }

    /// Decode the hex wire form back into a signed transfer.
    pub fn decode_hex(s: &str) -> Result<Self, TransferError> {
        let bytes = hex::decode(s).map_err(|e| TransferError::InvalidEncoding(e.to_string()))?;
        let (decoded, read): (Self, usize) =
            bincode::decode_from_slice(&bytes, bincode::config::standard())
                .map_err(|e| TransferError::InvalidEncoding(e.to_string()))?;
        if read != bytes.len() {
            return Err(TransferError::InvalidEncoding(format!(
                "{} trailing bytes",
                bytes.len() - read
            )));
        }
        Ok(decoded)
    }
}
