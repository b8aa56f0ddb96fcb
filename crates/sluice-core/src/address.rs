//! Address encoding for the Sluice network.
//!
//! Addresses use Bech32m encoding ([BIP-350]) with human-readable prefixes:
//! - Mainnet: `sl1...`
//! - Testnet: `tsl1...`
//!
//! Each address encodes a version value (currently 0) and the 32-byte
//! BLAKE3 hash of an ed25519 public key. The Bech32m checksum guarantees
//! detection of up to 4 character errors.
//!
//! [BIP-350]: https://github.com/bitcoin/bips/blob/master/bip-0350.mediawiki

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::crypto::PublicKey;
use crate::error::AddressError;
use crate::types::Hash256;

/// Bech32m checksum constant (BIP-350).
const BECH32M_CONST: u32 = 0x2bc830a3;

/// Bech32 character set for encoding 5-bit values.
const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Current address version.
pub const ADDRESS_VERSION: u8 = 0;

/// Network identifier determining the address prefix and the chain tag
/// used on the screening wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize,
    bincode::Encode, bincode::Decode)]
pub enum Network {
    /// Mainnet (HRP: "sl", addresses start with `sl1`).
    Mainnet,
    /// Testnet (HRP: "tsl", addresses start with `tsl1`).
    Testnet,
}

impl Network {
    /// Human-readable prefix for this network.
    pub fn hrp(&self) -> &'static str {
        match self {
            Network::Mainnet => "sl",
            Network::Testnet => "tsl",
        }
    }

    /// Look up a network from a human-readable prefix.
    pub fn from_hrp(hrp: &str) -> Result<Self, AddressError> {
        match hrp {
            "sl" => Ok(Network::Mainnet),
            "tsl" => Ok(Network::Testnet),
            _ => Err(AddressError::UnknownNetwork(hrp.to_string())),
        }
    }

    /// Chain tag carried in `chain=` query parameters.
    pub fn tag(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }

    /// Parse a chain tag ("mainnet" / "testnet").
    pub fn from_tag(tag: &str) -> Result<Self, AddressError> {
        match tag {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            _ => Err(AddressError::UnknownNetwork(tag.to_string())),
        }
    }
}

/// A Sluice address: a Bech32m-encoded pubkey hash.
///
/// Human-readable form is `sl1...` (mainnet) or `tsl1...` (testnet).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    network: Network,
    pubkey_hash: Hash256,
}

impl Address {
    /// Create an address from a pubkey hash and network.
    pub fn from_pubkey_hash(pubkey_hash: Hash256, network: Network) -> Self {
        Self { network, pubkey_hash }
    }

    /// Create an address from a public key and network.
    pub fn from_public_key(public_key: &PublicKey, network: Network) -> Self {
        Self::from_pubkey_hash(public_key.pubkey_hash(), network)
    }

    /// The BLAKE3 pubkey hash encoded in this address.
    pub fn pubkey_hash(&self) -> Hash256 {
        self.pubkey_hash
    }

    /// The network this address belongs to.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Encode this address as a Bech32m string.
    pub fn encode(&self) -> String {
        let hrp = self.network.hrp();

        // Version value followed by the hash regrouped into 5-bit values.
        let mut payload = vec![ADDRESS_VERSION];
        payload.extend(
            regroup_bits(self.pubkey_hash.as_bytes(), 8, 5, true)
                .expect("32 bytes always regroup into 5-bit values"),
        );

        let mut out = String::with_capacity(hrp.len() + 1 + payload.len() + 6);
        out.push_str(hrp);
        out.push('1');
        for &v in payload.iter().chain(make_checksum(hrp, &payload).iter()) {
            out.push(CHARSET[v as usize] as char);
        }
        out
    }

    /// Decode a Bech32m address string.
    pub fn decode(s: &str) -> Result<Self, AddressError> {
        // All alphabetic characters must share one case.
        if s.chars().any(|c| c.is_ascii_lowercase()) && s.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(AddressError::MixedCase);
        }
        let s = s.to_ascii_lowercase();

        let sep = s.rfind('1').ok_or(AddressError::MissingSeparator)?;
        if sep == 0 {
            return Err(AddressError::InvalidHrp);
        }
        // Version value + 6 checksum values must follow the separator.
        if sep + 8 > s.len() {
            return Err(AddressError::InvalidLength);
        }

        let hrp = &s[..sep];
        let mut data = Vec::with_capacity(s.len() - sep - 1);
        for c in s[sep + 1..].chars() {
            data.push(charset_index(c)?);
        }

        if !check_checksum(hrp, &data) {
            return Err(AddressError::InvalidChecksum);
        }

        let payload = &data[..data.len() - 6];
        let (&version, hash_5bit) = payload
            .split_first()
            .ok_or(AddressError::InvalidLength)?;
        if version != ADDRESS_VERSION {
            return Err(AddressError::InvalidVersion(version));
        }

        let hash_bytes =
            regroup_bits(hash_5bit, 5, 8, false).ok_or(AddressError::InvalidPadding)?;
        let hash: [u8; 32] = hash_bytes
            .try_into()
            .map_err(|_| AddressError::InvalidLength)?;

        Ok(Self {
            network: Network::from_hrp(hrp)?,
            pubkey_hash: Hash256(hash),
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}

// --- Bech32m internals ---

fn charset_index(c: char) -> Result<u8, AddressError> {
    CHARSET
        .iter()
        .position(|&ch| ch as char == c)
        .map(|p| p as u8)
        .ok_or(AddressError::InvalidCharacter(c))
}

/// Bech32m polymod over a sequence of 5-bit values.
fn polymod(values: &[u8]) -> u32 {
    const GEN: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];
    let mut chk: u32 = 1;
    for &v in values {
        let top = chk >> 25;
        chk = ((chk & 0x1ffffff) << 5) ^ (v as u32);
        for (i, &g) in GEN.iter().enumerate() {
            if (top >> i) & 1 != 0 {
                chk ^= g;
            }
        }
    }
    chk
}

/// Expand the HRP for checksum computation.
fn hrp_expand(hrp: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(hrp.len() * 2 + 1);
    out.extend(hrp.bytes().map(|b| b >> 5));
    out.push(0);
    out.extend(hrp.bytes().map(|b| b & 31));
    out
}

/// Create the 6-value Bech32m checksum for the given HRP and payload.
fn make_checksum(hrp: &str, payload: &[u8]) -> [u8; 6] {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(payload);
    values.extend_from_slice(&[0; 6]);
    let pm = polymod(&values) ^ BECH32M_CONST;
    let mut checksum = [0u8; 6];
    for (i, c) in checksum.iter_mut().enumerate() {
        *c = ((pm >> (5 * (5 - i))) & 31) as u8;
    }
    checksum
}

/// Verify the checksum over payload-plus-checksum data.
fn check_checksum(hrp: &str, data: &[u8]) -> bool {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    polymod(&values) == BECH32M_CONST
}

/// Regroup a bit string between widths (8-bit bytes ↔ 5-bit values).
fn regroup_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::new();
    let max = (1u32 << to) - 1;
    for &value in data {
        let v = value as u32;
        if v >> from != 0 {
            return None;
        }
        acc = (acc << from) | v;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max) as u8);
        }
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max) != 0 {
        return None;
    }
    Some(out)
}
