//! Service configuration loaded from environment variables.

use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct Config {
    /// Address to bind the HTTP server.
    pub bind_addr: String,
    /// Mainnet node JSON-RPC endpoint, when mainnet is served.
    pub node_mainnet: Option<String>,
    /// Testnet node JSON-RPC endpoint, when testnet is served.
    pub node_testnet: Option<String>,
    /// Browser origins allowed through CORS. Empty means none.
    pub allowed_origins: Vec<String>,
    /// Timeout for each chain probe.
    pub probe_timeout: Duration,
    /// Addresses that always score as blocklisted.
    pub blocklist: Vec<String>,
    /// Addresses that always score as allowlisted.
    pub allowlist: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let bind_addr =
            std::env::var("SCREEND_BIND").unwrap_or_else(|_| "0.0.0.0:8440".to_string());

        let node_mainnet = std::env::var("SCREEND_NODE_MAINNET").ok();
        let node_testnet = std::env::var("SCREEND_NODE_TESTNET").ok();
        if node_mainnet.is_none() && node_testnet.is_none() {
            anyhow::bail!(
                "at least one of SCREEND_NODE_MAINNET and SCREEND_NODE_TESTNET is required"
            );
        }

        let allowed_origins =
            split_list(&std::env::var("SCREEND_ALLOWED_ORIGINS").unwrap_or_default());

        let probe_timeout_secs: u64 = std::env::var("SCREEND_PROBE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "4".to_string())
            .parse()
            .context("SCREEND_PROBE_TIMEOUT_SECS must be a positive integer")?;

        let blocklist = split_list(&std::env::var("SCREEND_BLOCKLIST").unwrap_or_default());
        let allowlist = split_list(&std::env::var("SCREEND_ALLOWLIST").unwrap_or_default());

        Ok(Config {
            bind_addr,
            node_mainnet,
            node_testnet,
            allowed_origins,
            probe_timeout: Duration::from_secs(probe_timeout_secs),
            blocklist,
            allowlist,
        })
    }
}

/// Split a comma-separated variable into trimmed, non-empty entries.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
