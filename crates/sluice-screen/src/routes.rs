//! Axum router and HTTP handlers.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::extract::{Query, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use sluice_core::address::{Address, Network};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::score::Scorer;

/// Entries returned by `GET /account/txs`.
const TXS_PAGE: usize = 10;

/// One scorer per network this deployment serves.
#[derive(Clone)]
pub struct AppState {
    pub mainnet: Option<Arc<Scorer>>,
    pub testnet: Option<Arc<Scorer>>,
}

impl AppState {
    fn scorer(&self, network: Network) -> Option<&Arc<Scorer>> {
        match network {
            Network::Mainnet => self.mainnet.as_ref(),
            Network::Testnet => self.testnet.as_ref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring unparseable allowed origin");
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(86_400));

    Router::new()
        .route("/check", get(check))
        .route("/account/txs", get(account_txs))
        .route("/health", get(health))
        .with_state(state)
        .layer(cors)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AddressParams {
    address: String,
    #[serde(default = "default_chain")]
    chain: String,
}

fn default_chain() -> String {
    Network::Testnet.tag().to_string()
}

/// `GET /check?address=...&chain=...` — score a recipient.
async fn check(State(state): State<AppState>, Query(params): Query<AddressParams>) -> Response {
    let (scorer, address) = match resolve(&state, &params) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    let assessment = scorer.assess(&address, unix_now()).await;
    info!(
        address = %params.address,
        chain = %params.chain,
        score = assessment.score,
        "assessment served"
    );
    (StatusCode::OK, Json(assessment)).into_response()
}

/// `GET /account/txs?address=...&chain=...` — recent history, newest
/// first.
async fn account_txs(
    State(state): State<AppState>,
    Query(params): Query<AddressParams>,
) -> Response {
    let (scorer, address) = match resolve(&state, &params) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    match scorer.recent_history(&address, TXS_PAGE).await {
        Ok(txs) => (StatusCode::OK, Json(json!({"txs": txs}))).into_response(),
        Err(e) => {
            warn!(error = %e, address = %params.address, "history lookup failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": format!("history unavailable: {e}")})),
            )
                .into_response()
        }
    }
}

/// `GET /health` — liveness and build identity.
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "build": format!("{}-v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate the chain tag and address, and pick the scorer for them.
fn resolve<'a>(
    state: &'a AppState,
    params: &AddressParams,
) -> Result<(&'a Arc<Scorer>, Address), Response> {
    let network = Network::from_tag(&params.chain)
        .map_err(|_| bad_request(format!("unknown chain: {}", params.chain)))?;
    let scorer = state
        .scorer(network)
        .ok_or_else(|| bad_request(format!("chain {} is not served here", params.chain)))?;
    let address = Address::decode(params.address.trim())
        .map_err(|e| bad_request(format!("invalid address: {e}")))?;
    if address.network() != network {
        return Err(bad_request(format!(
            "address is not a {} address",
            params.chain
        )));
    }
    Ok((scorer, address))
}

fn bad_request(msg: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"error": msg}))).into_response()
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
