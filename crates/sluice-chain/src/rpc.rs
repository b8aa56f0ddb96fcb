//! JSON-RPC 2.0 client over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

use sluice_core::address::Address;
use sluice_core::error::ChainError;
use sluice_core::traits::ChainClient;
use sluice_core::transfer::Transfer;
use sluice_core::types::{FeeInfo, Hash256, HistoryEntry};

/// Default request timeout for node calls.
const RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// A [`ChainClient`] backed by a node's JSON-RPC endpoint.
pub struct RpcChain {
    client: Client,
    endpoint: String,
}

impl RpcChain {
    /// Connect to a node endpoint with the default timeout.
    pub fn new(endpoint: &str) -> Result<Self, ChainError> {
        Self::with_timeout(endpoint, RPC_TIMEOUT)
    }

    /// Connect with an explicit request timeout.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, ChainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_owned(),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        let resp: Value = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        if let Some(err) = resp.get("error") {
            if !err.is_null() {
                return Err(ChainError::Rpc(err.to_string()));
            }
        }
        serde_json::from_value(resp["result"].clone())
            .map_err(|e| ChainError::MalformedResponse(format!("{method}: {e}")))
    }
}

#[async_trait]
impl ChainClient for RpcChain {
    async fn fee_info(&self) -> Result<FeeInfo, ChainError> {
        self.call("getfeeinfo", json!([])).await
    }

    async fn estimate_gas(&self, transfer: &Transfer) -> Result<u64, ChainError> {
        let raw = transfer
            .encode_hex()
            .map_err(|e| ChainError::InvalidRequest(e.to_string()))?;
        self.call("estimategas", json!([raw])).await
    }

    async fn nonce(&self, address: &Address) -> Result<u64, ChainError> {
        self.call("getnonce", json!([address.encode()])).await
    }

    async fn broadcast(&self, raw_hex: &str) -> Result<Hash256, ChainError> {
        let txid: String = self.call("sendrawtransaction", json!([raw_hex])).await?;
        Hash256::from_hex(&txid)
            .map_err(|e| ChainError::MalformedResponse(format!("sendrawtransaction txid: {e}")))
    }

    async fn confirmations(&self, txid: &Hash256) -> Result<u64, ChainError> {
        self.call("getconfirmations", json!([txid.to_string()])).await
    }

    async fn code_at(&self, address: &Address) -> Result<Vec<u8>, ChainError> {
        let code: String = self.call("getcode", json!([address.encode()])).await?;
        hex::decode(&code).map_err(|e| ChainError::MalformedResponse(format!("getcode: {e}")))
    }

    async fn address_history(&self, address: &Address) -> Result<Vec<HistoryEntry>, ChainError> {
        self.call("getaddresshistory", json!([address.encode()])).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::State, routing::post};
    use sluice_core::address::Network;
    use std::sync::Arc;

    /// Spawn a one-route server that answers every POST with `response`.
    async fn serve_fixed(response: Value) -> String {
        let app = Router::new()
            .route(
                "/",
                post(|State(v): State<Arc<Value>>| async move { Json((*v).clone()) }),
            )
            .with_state(Arc::new(response));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn test_address() -> Address {
        Address::from_pubkey_hash(Hash256([3; 32]), Network::Testnet)
    }

    #[tokio::test]
    async fn parses_fee_info_result() {
        let endpoint = serve_fixed(json!({
            "jsonrpc": "2.0",
            "result": {"base_fee_per_gas": 10, "priority_fee_per_gas": 2},
            "id": 1
        }))
        .await;
        let chain = RpcChain::new(&endpoint).unwrap();
        let fees = chain.fee_info().await.unwrap();
        assert_eq!(fees.base_fee_per_gas, 10);
        assert_eq!(fees.priority_fee_per_gas, 2);
    }

    #[tokio::test]
    async fn surfaces_rpc_error_field() {
        let endpoint = serve_fixed(json!({
            "jsonrpc": "2.0",
            "result": null,
            "error": {"code": -32000, "message": "nonce too low"},
            "id": 1
        }))
        .await;
        let chain = RpcChain::new(&endpoint).unwrap();
        let err = chain.nonce(&test_address()).await.unwrap_err();
        match err {
            ChainError::Rpc(msg) => assert!(msg.contains("nonce too low")),
            other => panic!("expected Rpc error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn null_error_field_is_not_an_error() {
        let endpoint = serve_fixed(json!({
            "jsonrpc": "2.0",
            "result": 4,
            "error": null,
            "id": 1
        }))
        .await;
        let chain = RpcChain::new(&endpoint).unwrap();
        assert_eq!(chain.nonce(&test_address()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn type_mismatch_is_malformed_response() {
        let endpoint = serve_fixed(json!({
            "jsonrpc": "2.0",
            "result": "not a number",
            "id": 1
        }))
        .await;
        let chain = RpcChain::new(&endpoint).unwrap();
        assert!(matches!(
            chain.nonce(&test_address()).await.unwrap_err(),
            ChainError::MalformedResponse(_)
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let chain = RpcChain::new(&format!("http://{addr}")).unwrap();
        assert!(matches!(
            chain.fee_info().await.unwrap_err(),
            ChainError::Transport(_)
        ));
    }

    #[tokio::test]
    async fn broadcast_parses_txid() {
        let txid = Hash256([0x77; 32]);
        let endpoint = serve_fixed(json!({
            "jsonrpc": "2.0",
            "result": txid.to_string(),
            "id": 1
        }))
        .await;
        let chain = RpcChain::new(&endpoint).unwrap();
        assert_eq!(chain.broadcast("00ff").await.unwrap(), txid);
    }

    #[tokio::test]
    async fn broadcast_rejects_malformed_txid() {
        let endpoint = serve_fixed(json!({
            "jsonrpc": "2.0",
            "result": "xyz",
            "id": 1
        }))
        .await;
        let chain = RpcChain::new(&endpoint).unwrap();
        assert!(matches!(
            chain.broadcast("00ff").await.unwrap_err(),
            ChainError::MalformedResponse(_)
        ));
    }

    #[tokio::test]
    async fn code_at_decodes_hex() {
        let endpoint = serve_fixed(json!({
            "jsonrpc": "2.0",
            "result": "6080",
            "id": 1
        }))
        .await;
        let chain = RpcChain::new(&endpoint).unwrap();
        assert_eq!(
            chain.code_at(&test_address()).await.unwrap(),
            vec![0x60, 0x80]
        );
    }

    #[tokio::test]
    async fn address_history_parses_entries() {
        let endpoint = serve_fixed(json!({
            "jsonrpc": "2.0",
            "result": [{
                "txid": "11".repeat(32),
                "from": "tsl1sender",
                "to": "tsl1recipient",
                "value": 250,
                "timestamp": 1_700_000_000u64,
            }],
            "id": 1
        }))
        .await;
        let chain = RpcChain::new(&endpoint).unwrap();
        let history = chain.address_history(&test_address()).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].txid, Hash256([0x11; 32]));
        assert_eq!(history[0].value, 250);
    }
}
