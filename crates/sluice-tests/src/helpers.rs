//! Shared fixtures for E2E and integration tests.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sluice_core::address::{Address, Network};
use sluice_core::traits::MockChain;
use sluice_core::types::{Hash256, HistoryEntry};
use sluice_screen::{AppState, Lists, Probes, Scorer, router};
use sluice_wallet::{Wallet, WalletConfig};

/// Deterministic testnet address from a seed byte.
pub fn addr(byte: u8) -> Address {
    Address::from_pubkey_hash(Hash256::from_bytes([byte; 32]), Network::Testnet)
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// A confirmed payment into `to` at `timestamp`.
pub fn entry(to: &Address, timestamp: u64) -> HistoryEntry {
    HistoryEntry {
        txid: Hash256::from_bytes([0xCE; 32]),
        from: addr(0xFE).encode(),
        to: to.encode(),
        value: 1_000,
        timestamp,
    }
}

/// Give `address` a comfortably old transaction history on `chain`.
pub fn seed_old_history(chain: &MockChain, address: &Address) {
    let ancient = unix_now().saturating_sub(30 * 24 * 60 * 60);
    chain
        .history
        .lock()
        .insert(address.pubkey_hash(), vec![entry(address, ancient)]);
}

/// Serve a testnet scoring service over `chain`; returns its base URL.
pub async fn spawn_screen(chain: Arc<MockChain>, lists: Lists) -> String {
    let scorer = Scorer::new(
        Probes::new(chain, Duration::from_millis(250)),
        Arc::new(lists),
    );
    let state = AppState {
        mainnet: None,
        testnet: Some(Arc::new(scorer)),
    };
    serve_router(state).await
}

/// Serve an arbitrary screen state; returns its base URL.
pub async fn serve_router(state: AppState) -> String {
    let app = router(state, &[]);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let local = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{local}")
}

/// A wallet wired to `chain` and the scoring service at `gateway_url`,
/// with timers shortened for tests.
pub fn test_wallet(dir: &Path, gateway_url: &str, chain: Arc<MockChain>) -> Wallet {
    let mut config = WalletConfig::new(dir, Network::Testnet, gateway_url);
    config.auto_lock = Duration::from_millis(400);
    config.confirm_poll = Duration::from_millis(20);
    Wallet::new(config, chain).unwrap()
}
