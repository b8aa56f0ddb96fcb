//! The send path: screen the recipient, build and sign the transfer,
//! broadcast exactly once, then wait out the confirmation depth.

use sluice_core::amount::format_amount;
use sluice_core::risk::GateOutcome;
use sluice_core::transfer::{SignedTransfer, Transfer};
use sluice_core::types::Hash256;
use tracing::{debug, info, warn};

use crate::error::WalletError;
use crate::session::Wallet;

/// Outcome of a completed send.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub txid: Hash256,
    /// What the safety gate said about the recipient.
    pub outcome: GateOutcome,
    /// Confirmations observed when the wait ended.
    pub confirmations: u64,
    /// False only when a session lock cut the wait short; the transfer
    /// is on the network either way.
    pub confirmed: bool,
}

impl Wallet {
    /// Send `amount` from the account at `account_index` to `recipient`.
    ///
    /// The recipient is screened first; a blocking score stops the send
    /// before any chain interaction. Fee and gas lookups are advisory
    /// and their failures are logged, not fatal. The signed transfer is
    /// submitted exactly once, and submission failures surface as
    /// [`WalletError::Send`] without a retry. After broadcast the call
    /// waits inline until the configured confirmation depth is reached;
    /// only locking the session ends the wait early.
    pub async fn send(
        &self,
        account_index: u32,
        recipient: &str,
        amount: u64,
    ) -> Result<SendReceipt, WalletError> {
        let recipient_addr = self.parse_recipient(recipient)?;
        if amount == 0 {
            return Err(WalletError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }
        let (account, generation) = self.snapshot_account(account_index)?;

        let outcome = self.gateway().assess(&recipient_addr).await;
        let assessment = outcome.assessment();
        if assessment.is_blocking() {
            info!(
                score = assessment.score,
                recipient, "send blocked by safety gate"
            );
            return Err(WalletError::BlockedBySafetyGate {
                score: assessment.score,
                findings: assessment.findings.clone(),
            });
        }
        if outcome.is_degraded() {
            warn!(recipient, "screening degraded, proceeding at neutral score");
        }

        let nonce = self
            .chain()
            .nonce(account.address())
            .await
            .map_err(|e| WalletError::Send(e.to_string()))?;
        let mut transfer = Transfer::new(
            self.config().network,
            nonce,
            recipient_addr.pubkey_hash(),
            amount,
        );
        match self.chain().fee_info().await {
            Ok(fees) => {
                transfer.max_fee_per_gas = Some(fees.max_fee_per_gas());
                transfer.priority_fee_per_gas = Some(fees.priority_fee_per_gas);
            }
            Err(e) => warn!(error = %e, "fee query failed, sending without fee caps"),
        }
        match self.chain().estimate_gas(&transfer).await {
            Ok(gas) => transfer.gas_limit = Some(gas),
            Err(e) => warn!(error = %e, "gas estimate failed, sending without a limit"),
        }

        let signed = SignedTransfer::sign(transfer, account.keypair())
            .map_err(|e| WalletError::Send(e.to_string()))?;
        let raw = signed
            .encode_hex()
            .map_err(|e| WalletError::Send(e.to_string()))?;
        let txid = self
            .chain()
            .broadcast(&raw)
            .await
            .map_err(|e| WalletError::Send(e.to_string()))?;
        info!(%txid, gills = amount, amount = %format_amount(amount), "transfer broadcast");

        let (confirmations, confirmed) = self.await_confirmation(&txid, generation).await;
        Ok(SendReceipt {
            txid,
            outcome,
            confirmations,
            confirmed,
        })
    }

    /// Poll the chain until `confirm_depth` is reached. There is no
    /// timeout; poll failures are logged and retried. A stale session
    /// generation ends the wait with `confirmed = false`.
    async fn await_confirmation(&self, txid: &Hash256, generation: u64) -> (u64, bool) {
        let depth = self.config().confirm_depth;
        if depth == 0 {
            return (0, true);
        }
        let mut seen = 0;
        loop {
            if !self.generation_current(generation) {
                debug!(%txid, "session ended while awaiting confirmation");
                return (seen, false);
            }
            match self.chain().confirmations(txid).await {
                Ok(n) => {
                    seen = n;
                    if n >= depth {
                        info!(%txid, confirmations = n, "transfer confirmed");
                        return (n, true);
                    }
                }
                Err(e) => debug!(error = %e, "confirmation poll failed, retrying"),
            }
            tokio::time::sleep(self.config().confirm_poll).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::extract::State;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use sluice_core::address::Network;
    use sluice_core::error::ChainError;
    use sluice_core::risk::FINDING_BLOCKLIST;
    use sluice_core::traits::MockChain;

    use crate::mnemonic;
    use crate::session::WalletConfig;

    const PW: &str = "hunter2hunter2";

    /// Serve a fixed assessment for every `GET /check`.
    async fn serve_score(score: u8, findings: &[&str]) -> String {
        let body = json!({ "score": score, "findings": findings });
        let app = Router::new()
            .route(
                "/check",
                get(|State(body): State<Arc<Value>>| async move { Json((*body).clone()) }),
            )
            .with_state(Arc::new(body));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn wallet_against(
        gateway_url: &str,
        chain: Arc<MockChain>,
    ) -> (tempfile::TempDir, Wallet) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = WalletConfig::new(dir.path(), Network::Testnet, gateway_url);
        config.confirm_poll = Duration::from_millis(20);
        let wallet = Wallet::new(config, chain).unwrap();
        wallet.create(PW, &mnemonic::generate_phrase().unwrap()).unwrap();
        wallet.unlock(PW).await.unwrap();
        (dir, wallet)
    }

    fn recipient_on(network: Network) -> String {
        sluice_core::address::Address::from_pubkey_hash(
            Hash256::from_bytes([0xAB; 32]),
            network,
        )
        .encode()
    }

    // --- Safety gate ---

    #[tokio::test]
    async fn blocking_score_stops_send_before_broadcast() {
        let url = serve_score(80, &[FINDING_BLOCKLIST]).await;
        let chain = Arc::new(MockChain::new());
        let (_dir, wallet) = wallet_against(&url, chain.clone()).await;

        let err = wallet.send(0, &recipient_on(Network::Testnet), 500).await.unwrap_err();
        assert_eq!(
            err,
            WalletError::BlockedBySafetyGate {
                score: 80,
                findings: vec![FINDING_BLOCKLIST.to_string()],
            },
        );
        assert_eq!(chain.broadcast_count(), 0);
    }

    #[tokio::test]
    async fn threshold_score_is_not_blocking() {
        let url = serve_score(70, &["Has history"]).await;
        let chain = Arc::new(MockChain::new());
        *chain.confirmations.lock() = Ok(1);
        let (_dir, wallet) = wallet_against(&url, chain.clone()).await;

        let receipt = wallet.send(0, &recipient_on(Network::Testnet), 500).await.unwrap();
        assert!(receipt.confirmed);
        assert_eq!(chain.broadcast_count(), 1);
    }

    #[tokio::test]
    async fn score_above_threshold_blocks() {
        let url = serve_score(71, &[]).await;
        let chain = Arc::new(MockChain::new());
        let (_dir, wallet) = wallet_against(&url, chain.clone()).await;

        let err = wallet.send(0, &recipient_on(Network::Testnet), 500).await.unwrap_err();
        assert!(matches!(err, WalletError::BlockedBySafetyGate { score: 71, .. }));
    }

    #[tokio::test]
    async fn unreachable_gateway_fails_open() {
        let chain = Arc::new(MockChain::new());
        *chain.confirmations.lock() = Ok(1);
        let (_dir, wallet) = wallet_against("http://127.0.0.1:1", chain.clone()).await;

        let receipt = wallet.send(0, &recipient_on(Network::Testnet), 500).await.unwrap();
        assert!(receipt.outcome.is_degraded());
        assert_eq!(receipt.outcome.assessment().score, 50);
        assert_eq!(chain.broadcast_count(), 1);
    }

    // --- Transfer construction ---

    #[tokio::test]
    async fn sent_transfer_carries_fees_gas_and_value() {
        let url = serve_score(10, &[]).await;
        let chain = Arc::new(MockChain::new());
        *chain.confirmations.lock() = Ok(1);
        let (_dir, wallet) = wallet_against(&url, chain.clone()).await;

        let recipient = recipient_on(Network::Testnet);
        let receipt = wallet.send(0, &recipient, 12_345).await.unwrap();

        let broadcasts = chain.broadcasts.lock();
        assert_eq!(broadcasts.len(), 1);
        let transfer = &broadcasts[0].transfer;
        assert_eq!(transfer.value, 12_345);
        assert_eq!(transfer.nonce, 0);
        assert_eq!(transfer.network, Network::Testnet);
        assert_eq!(transfer.to, Hash256::from_bytes([0xAB; 32]));
        // MockChain defaults: base 10, priority 1, gas 21_000.
        assert_eq!(transfer.max_fee_per_gas, Some(21));
        assert_eq!(transfer.priority_fee_per_gas, Some(1));
        assert_eq!(transfer.gas_limit, Some(21_000));
        assert_eq!(receipt.txid, transfer.txid().unwrap());
    }

    #[tokio::test]
    async fn fee_and_gas_failures_are_not_fatal() {
        let url = serve_score(10, &[]).await;
        let chain = Arc::new(MockChain::new());
        *chain.fee_info.lock() = Err(ChainError::Transport("down".into()));
        *chain.gas_estimate.lock() = Err(ChainError::Rpc("overloaded".into()));
        *chain.confirmations.lock() = Ok(1);
        let (_dir, wallet) = wallet_against(&url, chain.clone()).await;

        wallet.send(0, &recipient_on(Network::Testnet), 500).await.unwrap();

        let broadcasts = chain.broadcasts.lock();
        let transfer = &broadcasts[0].transfer;
        assert_eq!(transfer.max_fee_per_gas, None);
        assert_eq!(transfer.priority_fee_per_gas, None);
        assert_eq!(transfer.gas_limit, None);
    }

    // --- Submission ---

    #[tokio::test]
    async fn broadcast_failure_surfaces_verbatim_without_retry() {
        let url = serve_score(10, &[]).await;
        let chain = Arc::new(MockChain::new());
        *chain.broadcast_error.lock() = Some(ChainError::Rpc("nonce too low".into()));
        let (_dir, wallet) = wallet_against(&url, chain.clone()).await;

        let err = wallet.send(0, &recipient_on(Network::Testnet), 500).await.unwrap_err();
        match err {
            WalletError::Send(msg) => assert!(msg.contains("nonce too low")),
            other => panic!("expected Send, got {other:?}"),
        }
        assert_eq!(chain.broadcast_count(), 0);
    }

    // --- Input validation ---

    #[tokio::test]
    async fn zero_amount_is_validation() {
        let chain = Arc::new(MockChain::new());
        let (_dir, wallet) = wallet_against("http://127.0.0.1:1", chain.clone()).await;

        let err = wallet.send(0, &recipient_on(Network::Testnet), 0).await.unwrap_err();
        assert!(matches!(err, WalletError::Validation(_)));
        assert_eq!(chain.broadcast_count(), 0);
    }

    #[tokio::test]
    async fn cross_network_recipient_is_validation() {
        let chain = Arc::new(MockChain::new());
        let (_dir, wallet) = wallet_against("http://127.0.0.1:1", chain.clone()).await;

        let err = wallet.send(0, &recipient_on(Network::Mainnet), 500).await.unwrap_err();
        assert!(matches!(err, WalletError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_account_index_is_validation() {
        let chain = Arc::new(MockChain::new());
        let (_dir, wallet) = wallet_against("http://127.0.0.1:1", chain.clone()).await;

        let err = wallet.send(7, &recipient_on(Network::Testnet), 500).await.unwrap_err();
        assert!(matches!(err, WalletError::Validation(_)));
    }

    #[tokio::test]
    async fn locked_wallet_cannot_send() {
        let chain = Arc::new(MockChain::new());
        let (_dir, wallet) = wallet_against("http://127.0.0.1:1", chain.clone()).await;
        wallet.lock();

        let err = wallet.send(0, &recipient_on(Network::Testnet), 500).await.unwrap_err();
        assert_eq!(err, WalletError::NotUnlocked);
    }

    // --- Confirmation wait ---

    #[tokio::test]
    async fn confirmation_wait_survives_poll_failures() {
        let url = serve_score(10, &[]).await;
        let chain = Arc::new(MockChain::new());
        *chain.confirmations.lock() = Err(ChainError::Transport("flaky".into()));
        let (_dir, wallet) = wallet_against(&url, chain.clone()).await;

        let send = tokio::spawn({
            let wallet = wallet.clone();
            async move { wallet.send(0, &recipient_on(Network::Testnet), 500).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        // Submission happened; the wait is riding out the poll errors.
        assert_eq!(chain.broadcast_count(), 1);
        assert!(!send.is_finished());

        *chain.confirmations.lock() = Ok(1);
        let receipt = send.await.unwrap().unwrap();
        assert!(receipt.confirmed);
        assert_eq!(receipt.confirmations, 1);
    }

    #[tokio::test]
    async fn lock_cancels_confirmation_wait() {
        let url = serve_score(10, &[]).await;
        let chain = Arc::new(MockChain::new());
        // Depth 1 is never reached.
        *chain.confirmations.lock() = Ok(0);
        let (_dir, wallet) = wallet_against(&url, chain.clone()).await;

        let send = tokio::spawn({
            let wallet = wallet.clone();
            async move { wallet.send(0, &recipient_on(Network::Testnet), 500).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(chain.broadcast_count(), 1);
        assert!(!send.is_finished());

        wallet.lock();
        let receipt = send.await.unwrap().unwrap();
        assert!(!receipt.confirmed);
    }

    #[tokio::test]
    async fn deeper_confirmation_depth_is_respected() {
        let url = serve_score(10, &[]).await;
        let chain = Arc::new(MockChain::new());
        *chain.confirmations.lock() = Ok(2);
        let dir = tempfile::tempdir().unwrap();
        let mut config = WalletConfig::new(dir.path(), Network::Testnet, url);
        config.confirm_depth = 3;
        config.confirm_poll = Duration::from_millis(20);
        let wallet = Wallet::new(config, chain.clone()).unwrap();
        wallet.create(PW, &mnemonic::generate_phrase().unwrap()).unwrap();
        wallet.unlock(PW).await.unwrap();

        let send = tokio::spawn({
            let wallet = wallet.clone();
            async move { wallet.send(0, &recipient_on(Network::Testnet), 500).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!send.is_finished());

        *chain.confirmations.lock() = Ok(3);
        let receipt = send.await.unwrap().unwrap();
        assert!(receipt.confirmed);
        assert_eq!(receipt.confirmations, 3);
    }

    #[tokio::test]
    async fn parallel_sends_from_different_accounts() {
        let url = serve_score(10, &[]).await;
        let chain = Arc::new(MockChain::new());
        *chain.confirmations.lock() = Ok(1);
        let (_dir, wallet) = wallet_against(&url, chain.clone()).await;
        wallet.add_account().unwrap();

        let recipient = recipient_on(Network::Testnet);
        let (a, b) = tokio::join!(
            wallet.send(0, &recipient, 100),
            wallet.send(1, &recipient, 200),
        );
        a.unwrap();
        b.unwrap();
        assert_eq!(chain.broadcast_count(), 2);
    }
}
