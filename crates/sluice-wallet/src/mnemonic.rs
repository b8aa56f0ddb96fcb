//! BIP-39 phrase generation and parsing.
//!
//! The vault stores the phrase itself; the 64-byte seed every account
//! key derives from is recomputed on each unlock via [`phrase_to_seed`].

use bip39::{Language, Mnemonic};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::WalletError;
use crate::keys::Seed;

/// Entropy behind a freshly generated phrase: 16 bytes, 12 words.
const ENTROPY_LEN: usize = 16;

/// Generate a new 12-word English phrase from OS entropy.
pub fn generate_phrase() -> Result<String, WalletError> {
    let mut entropy = [0u8; ENTROPY_LEN];
    OsRng.fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    Ok(mnemonic.to_string())
}

/// Parse a phrase, tolerating stray whitespace and mixed case.
pub fn parse_phrase(phrase: &str) -> Result<Mnemonic, WalletError> {
    let normalized = phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    Mnemonic::parse_in(Language::English, &normalized)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
}

/// Derive the 64-byte account seed from a phrase.
pub fn phrase_to_seed(phrase: &str) -> Result<Seed, WalletError> {
    let mnemonic = parse_phrase(phrase)?;
    Ok(Seed::from_bytes(mnemonic.to_seed("")))
}
