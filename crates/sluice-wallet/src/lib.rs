//! # sluice-wallet — password-locked wallet with recipient screening.
//!
//! Provides an encrypted-at-rest vault for the recovery phrase,
//! deterministic multi-account derivation from a single seed, a
//! lock/unlock session state machine with inactivity auto-lock, and a
//! send path that screens every recipient through the risk gateway
//! before signing and broadcasting.
//!
//! # Modules
//!
//! - [`error`] — `WalletError` enum
//! - [`vault`] — PBKDF2 + AES-256-GCM vault sealing
//! - [`store`] — on-disk vault and account-count records
//! - [`mnemonic`] — BIP-39 phrase generation and parsing
//! - [`keys`] — Seed and per-index account derivation
//! - [`gateway`] — risk gateway client with degraded fallback
//! - [`session`] — `Wallet` lifecycle and account registry
//! - [`send`] — transfer orchestration

pub mod error;
pub mod gateway;
pub mod keys;
pub mod mnemonic;
pub mod send;
pub mod session;
pub mod store;
pub mod vault;

// Re-exports for convenient access
pub use error::WalletError;
pub use gateway::RiskGateway;
pub use keys::{Account, Seed};
pub use mnemonic::generate_phrase;
pub use send::SendReceipt;
pub use session::{AccountInfo, Wallet, WalletConfig};
pub use vault::Vault;
