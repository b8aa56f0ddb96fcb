//! HTTP client for the recipient scoring service.
//!
//! The gateway fails open: any transport, status, or payload problem
//! collapses into [`GateOutcome::Degraded`] with the neutral score, and
//! the send path decides what to do with that. `assess` never errors.

use std::time::Duration;

use sluice_core::address::Address;
use sluice_core::risk::{GateOutcome, RiskAssessment};
use tracing::warn;

use crate::error::WalletError;

/// End-to-end timeout for one scoring request.
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for `GET /check` on the scoring service.
pub struct RiskGateway {
    client: reqwest::Client,
    base_url: String,
}

impl RiskGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, WalletError> {
        let client = reqwest::Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .build()
            .map_err(|e| WalletError::Io(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Score a recipient. Degrades to the neutral assessment instead of
    /// erroring when the service cannot produce a verdict.
    pub async fn assess(&self, address: &Address) -> GateOutcome {
        match self.try_assess(address).await {
            Ok(assessment) => GateOutcome::Assessed(assessment),
            Err(reason) => {
                warn!(reason = %reason, "scoring service unavailable, failing open");
                GateOutcome::Degraded(RiskAssessment::neutral())
            }
        }
    }

    async fn try_assess(&self, address: &Address) -> Result<RiskAssessment, String> {
        let url = format!("{}/check", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("address", address.encode()),
                ("chain", address.network().tag().to_string()),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("status {status}"));
        }

        let assessment: RiskAssessment = response
            .json()
            .await
            .map_err(|e| format!("malformed assessment: {e}"))?;
        if assessment.score > 100 {
            return Err(format!("score {} out of range", assessment.score));
        }
        Ok(assessment)
    }
}

impl std::fmt::Debug for RiskGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
