//! Wallet error types.

use thiserror::Error;

/// Errors that can occur in wallet operations.
///
/// `Auth`, `BlockedBySafetyGate`, and `Validation` are hard failures the
/// caller must act on. Degraded risk screening is not an error at all;
/// it surfaces as a [`GateOutcome::Degraded`](sluice_core::risk::GateOutcome)
/// on the send receipt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Wrong password or corrupted vault. The unlock path reports both
    /// the same way and never says which.
    #[error("authentication failed")]
    Auth,

    /// The operation needs secrets while the session is locked.
    #[error("wallet is locked")]
    NotUnlocked,

    /// Malformed address, amount, account index, or import file.
    #[error("validation: {0}")]
    Validation(String),

    /// The recipient's risk score exceeds the blocking threshold.
    /// Resolved only by choosing a different recipient.
    #[error("blocked by safety gate: score {score}")]
    BlockedBySafetyGate {
        /// The assessed score.
        score: u8,
        /// The findings behind the score.
        findings: Vec<String>,
    },

    /// Signing or submission failed. Fatal for this attempt; broadcasting
    /// is never retried automatically.
    #[error("send failed: {0}")]
    Send(String),

    /// No vault exists on disk.
    #[error("no vault found")]
    VaultMissing,

    /// A vault already exists and would be overwritten.
    #[error("vault already exists")]
    VaultExists,

    /// Encryption-side failure while sealing a vault.
    #[error("encryption: {0}")]
    Encryption(String),

    /// Invalid BIP-39 mnemonic phrase.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization of a persisted record failed.
    #[error("serialization: {0}")]
    Serialization(String),
}
