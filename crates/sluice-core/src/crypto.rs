//! Cryptographic primitives: ed25519 keypairs and detached signatures.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::CryptoError;
use crate::types::Hash256;

/// An ed25519 keypair for signing transfers.
///
/// `Debug` output carries the public key only, never the secret.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a fresh keypair from the OS entropy source.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Reconstruct a keypair from 32 secret bytes.
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(bytes),
        }
    }

    /// The 32 secret bytes of this keypair.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// The public half of this keypair.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Sign a message, producing a detached 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self::from_secret_bytes(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// An ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Parse a public key from its 32-byte encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidPublicKey)?;
        let verifying_key =
            VerifyingKey::from_bytes(&arr).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self { verifying_key })
    }

    /// The 32-byte encoding of this key.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// BLAKE3 hash of the key bytes. Addresses are built from this.
    pub fn pubkey_hash(&self) -> Hash256 {
        Hash256(*blake3::hash(&self.to_bytes()).as_bytes())
    }

    /// Verify a detached signature over a message.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let sig_arr: [u8; 64] = signature
            .try_into()
            .map_err(|_| CryptoError::InvalidSignature)?;
        let sig = Signature::from_bytes(&sig_arr);
        self.verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::VerificationFailed)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.to_bytes()))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = <Vec<u8>>::deserialize(deserializer)?;
        Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- KeyPair ---

    #[test]
    fn generate_produces_distinct_keys() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        assert_ne!(a.public_key().to_bytes(), b.public_key().to_bytes());
    }

    #[test]
    fn from_secret_bytes_is_deterministic() {
        let secret = [7u8; 32];
        let a = KeyPair::from_secret_bytes(&secret);
        let b = KeyPair::from_secret_bytes(&secret);
        assert_eq!(a.public_key().to_bytes(), b.public_key().to_bytes());
    }

    #[test]
    fn clone_preserves_identity() {
        let kp = KeyPair::generate();
        let cloned = kp.clone();
        assert_eq!(kp.secret_bytes(), cloned.secret_bytes());
        assert_eq!(kp.public_key(), cloned.public_key());
    }

    #[test]
    fn debug_redacts_secret() {
        let kp = KeyPair::from_secret_bytes(&[42u8; 32]);
        let debug = format!("{kp:?}");
        assert!(debug.contains("public_key"));
        assert!(!debug.contains(&hex::encode([42u8; 32])));
    }

    // --- Signatures ---

    #[test]
    fn sign_and_verify() {
        let kp = KeyPair::generate();
        let message = b"send 5 coins";
        let sig = kp.sign(message);
        assert_eq!(sig.len(), 64);
        assert!(kp.public_key().verify(message, &sig).is_ok());
    }

    #[test]
    fn verify_rejects_altered_message() {
        let kp = KeyPair::generate();
        let sig = kp.sign(b"send 5 coins");
        assert_eq!(
            kp.public_key().verify(b"send 500 coins", &sig).unwrap_err(),
            CryptoError::VerificationFailed
        );
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let signer = KeyPair::generate();
        let other = KeyPair::generate();
        let sig = signer.sign(b"message");
        assert_eq!(
            other.public_key().verify(b"message", &sig).unwrap_err(),
            CryptoError::VerificationFailed
        );
    }

    #[test]
    fn verify_rejects_malformed_signature() {
        let kp = KeyPair::generate();
        assert_eq!(
            kp.public_key().verify(b"message", &[0u8; 10]).unwrap_err(),
            CryptoError::InvalidSignature
        );
    }

    // --- PublicKey encoding ---

    #[test]
    fn public_key_byte_roundtrip() {
        let kp = KeyPair::generate();
        let pk = kp.public_key();
        let restored = PublicKey::from_bytes(&pk.to_bytes()).unwrap();
        assert_eq!(restored, pk);
    }

    #[test]
    fn public_key_rejects_wrong_length() {
        assert_eq!(
            PublicKey::from_bytes(&[1u8; 31]).unwrap_err(),
            CryptoError::InvalidPublicKey
        );
    }

    #[test]
    fn pubkey_hash_is_stable() {
        let kp = KeyPair::from_secret_bytes(&[9u8; 32]);
        let h1 = kp.public_key().pubkey_hash();
        let h2 = kp.public_key().pubkey_hash();
        assert_eq!(h1, h2);
        assert_ne!(h1, Hash256::ZERO);
    }

    #[test]
    fn pubkey_hash_differs_between_keys() {
        let a = KeyPair::from_secret_bytes(&[1u8; 32]);
        let b = KeyPair::from_secret_bytes(&[2u8; 32]);
        assert_ne!(a.public_key().pubkey_hash(), b.public_key().pubkey_hash());
    }
}
