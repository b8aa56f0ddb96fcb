//! Error types shared across the Sluice workspace.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid HRP")] InvalidHrp,
    #[error("invalid length")] InvalidLength,
    #[error("invalid checksum")] InvalidChecksum,
    #[error("invalid character: {0}")] InvalidCharacter(char),
    #[error("invalid version: {0}")] InvalidVersion(u8),
    #[error("invalid padding bits")] InvalidPadding,
    #[error("unknown network: {0}")] UnknownNetwork(String),
    #[error("missing separator")] MissingSeparator,
    #[error("mixed case")] MixedCase,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("invalid signature bytes")] InvalidSignature,
    #[error("signature verification failed")] VerificationFailed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")] Empty,
    #[error("not a decimal number: {0}")] NotANumber(String),
    #[error("amount must be greater than zero")] NotPositive,
    #[error("too many decimal places: {0} (max 8)")] TooManyDecimals(usize),
    #[error("amount overflow")] Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("zero-value transfer")] ZeroValue,
    #[error("recipient network {recipient} does not match sender network {sender}")]
    NetworkMismatch { sender: String, recipient: String },
    #[error("serialization: {0}")] Serialization(String),
    #[error("invalid transfer encoding: {0}")] InvalidEncoding(String),
    #[error(transparent)] Crypto(#[from] CryptoError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("transport: {0}")] Transport(String),
    #[error("rpc error: {0}")] Rpc(String),
    #[error("malformed response: {0}")] MalformedResponse(String),
    #[error("invalid request: {0}")] InvalidRequest(String),
}
