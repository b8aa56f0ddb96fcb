//! Shared value types.
//!
//! All monetary values are in gills (1 SLC = 10^8 gills) and all numeric
//! fields use u64 per protocol convention.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 32-byte hash value.
///
/// Used for transaction IDs, pubkey hashes, and signing digests, all of
/// which are BLAKE3 in this protocol. Serde represents it as a lowercase
/// hex string, matching the node's JSON wire format; bincode carries the
/// raw bytes.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The zero hash (32 zero bytes).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a Hash256 from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for Hash256 {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Hash256 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// One confirmed transaction touching an address, as reported by a node's
/// history index. Ordered oldest-first by the upstream.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Transaction ID.
    pub txid: Hash256,
    /// Sender address, encoded.
    pub from: String,
    /// Recipient address, encoded.
    pub to: String,
    /// Transferred value in gills.
    pub value: u64,
    /// Unix timestamp (seconds) of the containing block.
    pub timestamp: u64,
}

/// Current fee parameters reported by a node.
///
/// The send path derives its fee ceiling from these as
/// `base_fee_per_gas * 2 + priority_fee_per_gas`, leaving headroom for
/// one base-fee doubling while the transfer waits for inclusion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeInfo {
    /// Current base fee per gas unit, in gills.
    pub base_fee_per_gas: u64,
    /// Suggested priority tip per gas unit, in gills.
    pub priority_fee_per_gas: u64,
}

impl FeeInfo {
    /// Fee ceiling for a transfer submitted under these parameters.
    pub fn max_fee_per_gas(&self) -> u64 {
        self.base_fee_per_gas
            .saturating_mul(2)
            .saturating_add(self.priority_fee_per_gas)
    }
}
