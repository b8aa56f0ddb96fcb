//! Chain probes with a hard per-call timeout.
//!
//! Scoring must answer quickly even when the node is wedged, so every
//! probe is capped by a timeout and reports the overrun as an ordinary
//! [`ChainError`]. The scorer treats any probe error as a missing
//! signal, never as a failed assessment.

use std::sync::Arc;
use std::time::Duration;

use sluice_core::address::Address;
use sluice_core::error::ChainError;
use sluice_core::traits::ChainClient;
use sluice_core::types::HistoryEntry;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(4);

/// A chain client with a deadline on every probe.
pub struct Probes {
    chain: Arc<dyn ChainClient>,
    timeout: Duration,
}

impl Probes {
    pub fn new(chain: Arc<dyn ChainClient>, timeout: Duration) -> Self {
        Self { chain, timeout }
    }

    /// Whether the address has deployed bytecode.
    pub async fn code_present(&self, address: &Address) -> Result<bool, ChainError> {
        let code = tokio::time::timeout(self.timeout, self.chain.code_at(address))
            .await
            .map_err(|_| ChainError::Transport("probe timed out".to_string()))??;
        Ok(!code.is_empty())
    }

    /// Confirmed history for the address, oldest first.
    pub async fn history(&self, address: &Address) -> Result<Vec<HistoryEntry>, ChainError> {
        tokio::time::timeout(self.timeout, self.chain.address_history(address))
            .await
            .map_err(|_| ChainError::Transport("probe timed out".to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sluice_core::address::Network;
    use sluice_core::traits::MockChain;
    use sluice_core::transfer::Transfer;
    use sluice_core::types::{FeeInfo, Hash256};

    fn addr(byte: u8) -> Address {
        Address::from_pubkey_hash(Hash256::from_bytes([byte; 32]), Network::Testnet)
    }

    fn probes(chain: Arc<MockChain>) -> Probes {
        Probes::new(chain, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn code_probe_reports_presence() {
        let chain = Arc::new(MockChain::new());
        chain.code.lock().insert(addr(1).pubkey_hash(), vec![0x60]);
        let probes = probes(chain);

        assert!(probes.code_present(&addr(1)).await.unwrap());
        assert!(!probes.code_present(&addr(2)).await.unwrap());
    }

    #[tokio::test]
    async fn history_probe_passes_entries_through() {
        let chain = Arc::new(MockChain::new());
        let entry = HistoryEntry {
            txid: Hash256::from_bytes([9; 32]),
            from: addr(1).encode(),
            to: addr(2).encode(),
            value: 100,
            timestamp: 1_700_000_000,
        };
        chain.history.lock().insert(addr(2).pubkey_hash(), vec![entry.clone()]);
        let probes = probes(chain);

        assert_eq!(probes.history(&addr(2)).await.unwrap(), vec![entry]);
        assert!(probes.history(&addr(3)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn staged_errors_surface() {
        let chain = Arc::new(MockChain::new());
        *chain.code_error.lock() = Some(ChainError::Rpc("node busy".into()));
        let probes = probes(chain);

        assert!(probes.code_present(&addr(1)).await.is_err());
    }

    /// A chain that never answers.
    struct StuckChain;

    #[async_trait]
    impl ChainClient for StuckChain {
        async fn fee_info(&self) -> Result<FeeInfo, ChainError> {
            unimplemented!()
        }
        async fn estimate_gas(&self, _t: &Transfer) -> Result<u64, ChainError> {
            unimplemented!()
        }
        async fn nonce(&self, _a: &Address) -> Result<u64, ChainError> {
            unimplemented!()
        }
        async fn broadcast(&self, _raw: &str) -> Result<Hash256, ChainError> {
            unimplemented!()
        }
        async fn confirmations(&self, _t: &Hash256) -> Result<u64, ChainError> {
            unimplemented!()
        }
        async fn code_at(&self, _a: &Address) -> Result<Vec<u8>, ChainError> {
            std::future::pending().await
        }
        async fn address_history(&self, _a: &Address) -> Result<Vec<HistoryEntry>, ChainError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn slow_probe_times_out() {
        let probes = Probes::new(Arc::new(StuckChain), Duration::from_millis(30));

        let err = probes.code_present(&addr(1)).await.unwrap_err();
        assert_eq!(err, ChainError::Transport("probe timed out".to_string()));
        assert!(probes.history(&addr(1)).await.is_err());
    }
}
