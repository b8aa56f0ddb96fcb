//! Seed handling and deterministic account derivation.
//!
//! Every account key is a pure function of (seed, index): rebuilding a
//! wallet from its phrase always yields the same accounts in the same
//! order.

use sluice_core::address::{Address, Network};
use sluice_core::crypto::KeyPair;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Domain separation for account key derivation.
const KDF_CONTEXT: &str = "sluice-wallet account v1";

/// The 64-byte BIP-39 seed. Wiped on drop; never printed.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed {
    bytes: [u8; 64],
}

impl Seed {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.bytes
    }
}

impl Clone for Seed {
    fn clone(&self) -> Self {
        Self { bytes: self.bytes }
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Seed([REDACTED])")
    }
}

/// A derived account: index, signing key, and the address it pays to.
#[derive(Debug, Clone)]
pub struct Account {
    index: u32,
    keypair: KeyPair,
    address: Address,
}

impl Account {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}

/// Derive the account at `index`.
pub fn derive_account(seed: &Seed, index: u32, network: Network) -> Account {
    let mut ikm = Zeroizing::new([0u8; 68]);
    ikm[..64].copy_from_slice(seed.as_bytes());
    ikm[64..].copy_from_slice(&index.to_le_bytes());

    let mut secret = blake3::derive_key(KDF_CONTEXT, ikm.as_ref());
    let keypair = KeyPair::from_secret_bytes(&secret);
    secret.zeroize();

    let address = Address::from_public_key(&keypair.public_key(), network);
    Account { index, keypair, address }
}

/// Derive accounts 0..count in order.
pub fn derive_accounts(seed: &Seed, count: u32, network: Network) -> Vec<Account> {
    (0..count).map(|i| derive_account(seed, i, network)).collect()
}
