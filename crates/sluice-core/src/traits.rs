//! Abstraction over the chain node consulted by the wallet and the
//! scoring service.
//!
//! [`ChainClient`] is the seam between transfer orchestration and the
//! network: the wallet queries fees, nonces, and confirmations through
//! it, and the scoring service reuses the bytecode and history lookups
//! for its probes. [`MockChain`] is a programmable in-memory
//! implementation for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::address::Address;
use crate::error::ChainError;
use crate::transfer::{SignedTransfer, Transfer};
use crate::types::{FeeInfo, Hash256, HistoryEntry};

/// Read and submit access to a chain node.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current fee parameters.
    async fn fee_info(&self) -> Result<FeeInfo, ChainError>;

    /// Estimate the gas a transfer would consume.
    async fn estimate_gas(&self, transfer: &Transfer) -> Result<u64, ChainError>;

    /// Next unused nonce for an address.
    async fn nonce(&self, address: &Address) -> Result<u64, ChainError>;

    /// Submit a hex-encoded signed transfer. Returns its txid.
    async fn broadcast(&self, raw_hex: &str) -> Result<Hash256, ChainError>;

    /// Confirmation count for a transaction; 0 while unconfirmed.
    async fn confirmations(&self, txid: &Hash256) -> Result<u64, ChainError>;

    /// Deployed bytecode at an address; empty for plain accounts.
    async fn code_at(&self, address: &Address) -> Result<Vec<u8>, ChainError>;

    /// Confirmed transactions touching an address, oldest first.
    async fn address_history(&self, address: &Address) -> Result<Vec<HistoryEntry>, ChainError>;
}

/// In-memory [`ChainClient`] with programmable responses.
///
/// Each response slot holds the full `Result`, so tests can stage
/// per-call failures. Broadcast decodes submissions like a real node
/// and records them for inspection.
pub struct MockChain {
    /// Response for [`ChainClient::fee_info`].
    pub fee_info: Mutex<Result<FeeInfo, ChainError>>,
    /// Response for [`ChainClient::estimate_gas`].
    pub gas_estimate: Mutex<Result<u64, ChainError>>,
    /// Per-address nonces; addresses not present read as 0.
    pub nonces: Mutex<HashMap<Hash256, u64>>,
    /// When set, broadcast fails with this error instead of accepting.
    pub broadcast_error: Mutex<Option<ChainError>>,
    /// Every successfully decoded submission, in order.
    pub broadcasts: Mutex<Vec<SignedTransfer>>,
    /// Response for [`ChainClient::confirmations`].
    pub confirmations: Mutex<Result<u64, ChainError>>,
    /// Per-address deployed bytecode.
    pub code: Mutex<HashMap<Hash256, Vec<u8>>>,
    /// When set, [`ChainClient::code_at`] fails with this error.
    pub code_error: Mutex<Option<ChainError>>,
    /// Per-address history; addresses not present read as empty.
    pub history: Mutex<HashMap<Hash256, Vec<HistoryEntry>>>,
    /// When set, [`ChainClient::address_history`] fails with this error.
    pub history_error: Mutex<Option<ChainError>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            fee_info: Mutex::new(Ok(FeeInfo {
                base_fee_per_gas: 10,
                priority_fee_per_gas: 1,
            })),
            gas_estimate: Mutex::new(Ok(21_000)),
            nonces: Mutex::new(HashMap::new()),
            broadcast_error: Mutex::new(None),
            broadcasts: Mutex::new(Vec::new()),
            confirmations: Mutex::new(Ok(0)),
            code: Mutex::new(HashMap::new()),
            code_error: Mutex::new(None),
            history: Mutex::new(HashMap::new()),
            history_error: Mutex::new(None),
        }
    }
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of submissions accepted so far.
    pub fn broadcast_count(&self) -> usize {
        self.broadcasts.lock().len()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn fee_info(&self) -> Result<FeeInfo, ChainError> {
        self.fee_info.lock().clone()
    }

    async fn estimate_gas(&self, _transfer: &Transfer) -> Result<u64, ChainError> {
        self.gas_estimate.lock().clone()
    }

    async fn nonce(&self, address: &Address) -> Result<u64, ChainError> {
        Ok(self
            .nonces
            .lock()
            .get(&address.pubkey_hash())
            .copied()
            .unwrap_or(0))
    }

    async fn broadcast(&self, raw_hex: &str) -> Result<Hash256, ChainError> {
        if let Some(err) = self.broadcast_error.lock().clone() {
            return Err(err);
        }
        let signed = SignedTransfer::decode_hex(raw_hex)
            .map_err(|e| ChainError::Rpc(format!("transaction decode: {e}")))?;
        let txid = signed
            .transfer
            .txid()
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        self.broadcasts.lock().push(signed);
        Ok(txid)
    }

    async fn confirmations(&self, _txid: &Hash256) -> Result<u64, ChainError> {
        self.confirmations.lock().clone()
    }

    async fn code_at(&self, address: &Address) -> Result<Vec<u8>, ChainError> {
        if let Some(err) = self.code_error.lock().clone() {
            return Err(err);
        }
        Ok(self
            .code
            .lock()
            .get(&address.pubkey_hash())
            .cloned()
            .unwrap_or_default())
    }

    async fn address_history(&self, address: &Address) -> Result<Vec<HistoryEntry>, ChainError> {
        if let Some(err) = self.history_error.lock().clone() {
            return Err(err);
        }
        Ok(self
            .history
            .lock()
            .get(&address.pubkey_hash())
            .cloned()
            .unwrap_or_default())
    }
}
