//! Risk assessment types shared by the wallet gateway and the scoring
//! service.

use serde::{Deserialize, Serialize};

use crate::constants::{BLOCKING_THRESHOLD, NEUTRAL_SCORE};

/// Finding attached when the recipient is on the blocklist.
pub const FINDING_BLOCKLIST: &str = "Blocklist match";
/// Finding attached when the recipient is on the allowlist.
pub const FINDING_ALLOWLIST: &str = "Allowlist";
/// Finding attached when bytecode is present at the recipient address.
pub const FINDING_CONTRACT: &str = "Address is a contract";
/// Finding attached when the recipient has no transaction history.
pub const FINDING_NO_HISTORY: &str = "No history";
/// Finding attached when the recipient's first transaction is recent.
pub const FINDING_YOUNG_ADDRESS: &str = "Very new address";
/// Finding attached when the recipient has established history.
pub const FINDING_HAS_HISTORY: &str = "Has history";
/// Finding attached when the bytecode probe failed.
pub const FINDING_CODE_CHECK_FAILED: &str = "Code check failed";
/// Finding attached when the history probe failed.
pub const FINDING_HISTORY_FETCH_FAILED: &str = "History fetch failed";
/// Finding attached when the scoring service could not be reached at all.
pub const FINDING_SERVICE_UNREACHABLE: &str = "service unreachable";

/// A risk score with the findings that produced it.
///
/// This is the wire shape returned by `GET /check` and consumed by the
/// wallet's gateway client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Score in `[0, 100]`; higher is riskier.
    pub score: u8,
    /// Human-readable findings explaining the score.
    pub findings: Vec<String>,
}

impl RiskAssessment {
    /// Build an assessment, clamping the raw score into `[0, 100]`.
    pub fn new(raw_score: i64, findings: Vec<String>) -> Self {
        Self {
            score: raw_score.clamp(0, 100) as u8,
            findings,
        }
    }

    /// The neutral fallback used when no assessment could be obtained.
    ///
    /// Its score sits below the blocking threshold, so an unreachable
    /// scoring service degrades to warnings instead of blocking sends.
    pub fn neutral() -> Self {
        Self {
            score: NEUTRAL_SCORE,
            findings: vec![FINDING_SERVICE_UNREACHABLE.to_string()],
        }
    }

    /// Whether this score is high enough to block a send.
    pub fn is_blocking(&self) -> bool {
        self.score > BLOCKING_THRESHOLD
    }
}

/// The result of asking the gateway about a recipient.
///
/// `Degraded` carries the neutral fallback and means the service could
/// not produce a real assessment; callers surface it differently but
/// apply the same blocking rule to both variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateOutcome {
    /// The scoring service answered.
    Assessed(RiskAssessment),
    /// The scoring service was unreachable or answered malformed.
    Degraded(RiskAssessment),
}

impl GateOutcome {
    /// The assessment, regardless of how it was obtained.
    pub fn assessment(&self) -> &RiskAssessment {
        match self {
            GateOutcome::Assessed(a) | GateOutcome::Degraded(a) => a,
        }
    }

    /// Whether this outcome is the degraded fallback.
    pub fn is_degraded(&self) -> bool {
        matches!(self, GateOutcome::Degraded(_))
    }
}
