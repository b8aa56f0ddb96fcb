//! sluice-screend — recipient scoring service.
//!
//! Answers `GET /check?address=...&chain=...` with a risk score built
//! from operator lists and live chain probes, plus `GET /account/txs`
//! for recent history and `GET /health` for liveness. Configured
//! entirely from `SCREEND_*` environment variables.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use sluice_chain::RpcChain;
use sluice_screen::{AppState, Config, Lists, Probes, Scorer, router};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("Failed to load screend configuration")?;

    let lists = Arc::new(Lists::new(
        config.blocklist.clone(),
        config.allowlist.clone(),
    ));
    let (blocked, allowed) = lists.counts();

    info!(
        bind = %config.bind_addr,
        mainnet = config.node_mainnet.is_some(),
        testnet = config.node_testnet.is_some(),
        blocked,
        allowed,
        "Starting sluice-screend"
    );

    let state = AppState {
        mainnet: scorer_for(config.node_mainnet.as_deref(), &config, &lists)?,
        testnet: scorer_for(config.node_testnet.as_deref(), &config, &lists)?,
    };
    let app = router(state, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await.context("HTTP server error")?;

    Ok(())
}

/// Build the scorer for one network, when its node is configured.
fn scorer_for(
    endpoint: Option<&str>,
    config: &Config,
    lists: &Arc<Lists>,
) -> Result<Option<Arc<Scorer>>> {
    let Some(endpoint) = endpoint else {
        return Ok(None);
    };
    let chain =
        RpcChain::new(endpoint).with_context(|| format!("node client for {endpoint}"))?;
    let probes = Probes::new(Arc::new(chain), config.probe_timeout);
    Ok(Some(Arc::new(Scorer::new(probes, lists.clone()))))
}
