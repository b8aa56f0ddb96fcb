//! PBKDF2 + AES-256-GCM vault sealing.
//!
//! The vault is the only at-rest record containing secret material. Its
//! key is derived from the password with PBKDF2-HMAC-SHA256 at a fixed,
//! high iteration count; a fresh random salt and nonce are drawn on
//! every seal, so re-encrypting the same phrase under the same password
//! never reuses either.
//!
//! Opening collapses every failure — wrong password, tampered bytes,
//! malformed structure, unknown version — into [`WalletError::Auth`].
//! Callers must not be able to tell which cause occurred.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::WalletError;

/// Current vault record version.
pub const VAULT_VERSION: u32 = 1;

/// PBKDF2-HMAC-SHA256 iteration count.
const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// AES-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// Hex encoding for byte fields in the portable JSON form.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// The persisted encrypted-at-rest record.
///
/// Replaced wholesale on every save or import, never mutated in place.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Vault {
    /// Record format version, currently [`VAULT_VERSION`].
    pub version: u32,
    /// The encrypted payload.
    pub enc: EncryptedPayload,
}

/// Ciphertext plus the non-secret parameters needed to open it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// AES-256-GCM ciphertext including the authentication tag.
    #[serde(with = "hex_bytes")]
    pub ciphertext: Vec<u8>,
    /// 12-byte nonce, fresh per seal.
    #[serde(with = "hex_bytes")]
    pub nonce: Vec<u8>,
    /// 16-byte KDF salt, fresh per seal.
    #[serde(with = "hex_bytes")]
    pub salt: Vec<u8>,
}

impl Vault {
    /// Serialize to the portable JSON form used for export files.
    pub fn to_json(&self) -> Result<String, WalletError> {
        serde_json::to_string_pretty(self).map_err(|e| WalletError::Serialization(e.to_string()))
    }

    /// Parse a portable vault file.
    ///
    /// Import is the one place structural problems are reported as
    /// [`WalletError::Validation`] rather than `Auth`: a file missing its
    /// ciphertext must be rejected up front, not accepted and then fail
    /// every unlock.
    pub fn from_json(s: &str) -> Result<Self, WalletError> {
        let vault: Vault = serde_json::from_str(s)
            .map_err(|e| WalletError::Validation(format!("invalid vault file: {e}")))?;
        if vault.enc.ciphertext.is_empty() {
            return Err(WalletError::Validation("vault file has no ciphertext".into()));
        }
        Ok(vault)
    }
}

/// Derive the 256-bit vault key from a password and salt.
///
/// The key lives in a [`Zeroizing`] buffer so it is wiped on every exit
/// path of the caller.
fn derive_key(password: &str, salt: &[u8]) -> Zeroizing<[u8; 32]> {
    let mut key = Zeroizing::new([0u8; 32]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key[..]);
    key
}

/// Encrypt a plaintext under a password into a fresh vault record.
pub fn seal(password: &str, plaintext: &[u8]) -> Result<Vault, WalletError> {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key[..])
        .map_err(|e| WalletError::Encryption(e.to_string()))?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| WalletError::Encryption(e.to_string()))?;

    Ok(Vault {
        version: VAULT_VERSION,
        enc: EncryptedPayload {
            ciphertext,
            nonce: nonce_bytes.to_vec(),
            salt: salt.to_vec(),
        },
    })
}

/// Decrypt a vault record with a password.
///
/// Returns the plaintext in a [`Zeroizing`] buffer. Every failure is
/// [`WalletError::Auth`].
pub fn open(password: &str, vault: &Vault) -> Result<Zeroizing<Vec<u8>>, WalletError> {
    if vault.version != VAULT_VERSION {
        return Err(WalletError::Auth);
    }
    if vault.enc.nonce.len() != NONCE_LEN || vault.enc.salt.len() != SALT_LEN {
        return Err(WalletError::Auth);
    }

    let key = derive_key(password, &vault.enc.salt);
    let cipher = Aes256Gcm::new_from_slice(&key[..]).map_err(|_| WalletError::Auth)?;
    let nonce = Nonce::from_slice(&vault.enc.nonce);

    cipher
        .decrypt(nonce, vault.enc.ciphertext.as_slice())
        .map(Zeroizing::new)
        .map_err(|_| WalletError::Auth)
}
