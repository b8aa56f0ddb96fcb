//! The scoring ruleset.
//!
//! Every assessment starts from a base score and accumulates weighted
//! signals. List membership is checked first and short-circuits the
//! chain probes entirely. The two probes run concurrently; a probe
//! failure drops that signal's contribution and records a finding
//! naming the gap, so a partially blind assessment still answers.

use std::sync::Arc;

use sluice_core::address::Address;
use sluice_core::constants::{
    RISK_ALLOWLISTED, RISK_BASE, RISK_BLOCKLISTED, RISK_CONTRACT_WEIGHT, RISK_NO_HISTORY_WEIGHT,
    RISK_YOUNG_ADDRESS_WEIGHT, YOUNG_ADDRESS_WINDOW_SECS,
};
use sluice_core::error::ChainError;
use sluice_core::risk::{
    FINDING_ALLOWLIST, FINDING_BLOCKLIST, FINDING_CODE_CHECK_FAILED, FINDING_CONTRACT,
    FINDING_HAS_HISTORY, FINDING_HISTORY_FETCH_FAILED, FINDING_NO_HISTORY,
    FINDING_YOUNG_ADDRESS, RiskAssessment,
};
use sluice_core::types::HistoryEntry;
use tracing::debug;

use crate::lists::Lists;
use crate::probes::Probes;

/// Aggregates list checks and chain probes into one assessment.
pub struct Scorer {
    probes: Probes,
    lists: Arc<Lists>,
}

impl Scorer {
    pub fn new(probes: Probes, lists: Arc<Lists>) -> Self {
        Self { probes, lists }
    }

    /// Score `address` as of `now` (unix seconds).
    pub async fn assess(&self, address: &Address, now: u64) -> RiskAssessment {
        if self.lists.is_blocked(address) {
            return RiskAssessment::new(
                RISK_BLOCKLISTED as i64,
                vec![FINDING_BLOCKLIST.to_string()],
            );
        }
        if self.lists.is_allowed(address) {
            return RiskAssessment::new(
                RISK_ALLOWLISTED as i64,
                vec![FINDING_ALLOWLIST.to_string()],
            );
        }

        let mut score = RISK_BASE as i64;
        let mut findings = Vec::new();

        let (code, history) = tokio::join!(
            self.probes.code_present(address),
            self.probes.history(address),
        );

        match code {
            Ok(true) => {
                score += RISK_CONTRACT_WEIGHT as i64;
                findings.push(FINDING_CONTRACT.to_string());
            }
            Ok(false) => {}
            Err(e) => {
                debug!(error = %e, "code probe failed");
                findings.push(FINDING_CODE_CHECK_FAILED.to_string());
            }
        }

        match history {
            Ok(entries) if entries.is_empty() => {
                score += RISK_NO_HISTORY_WEIGHT as i64;
                findings.push(FINDING_NO_HISTORY.to_string());
            }
            Ok(entries) => {
                let earliest = entries.iter().map(|e| e.timestamp).min().unwrap_or(0);
                if now.saturating_sub(earliest) < YOUNG_ADDRESS_WINDOW_SECS {
                    score += RISK_YOUNG_ADDRESS_WEIGHT as i64;
                    findings.push(FINDING_YOUNG_ADDRESS.to_string());
                } else {
                    findings.push(FINDING_HAS_HISTORY.to_string());
                }
            }
            Err(e) => {
                debug!(error = %e, "history probe failed");
                findings.push(FINDING_HISTORY_FETCH_FAILED.to_string());
            }
        }

        RiskAssessment::new(score, findings)
    }

    /// Most recent confirmed transactions, newest first, capped at
    /// `limit`. Shares the probe timeout.
    pub async fn recent_history(
        &self,
        address: &Address,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, ChainError> {
        let mut entries = self.probes.history(address).await?;
        entries.reverse();
        entries.truncate(limit);
        Ok(entries)
    }
}
