//! Protocol constants. All monetary values in gills (1 SLC = 10^8 gills).

pub const COIN: u64 = 100_000_000;

/// Maximum decimal places accepted when parsing SLC amounts.
pub const AMOUNT_DECIMALS: usize = 8;

// --- Recipient screening ---
//
// Scores are additive on top of [`RISK_BASE`] and clamped to 0..=100.
// The list scores are absolute: a list hit replaces the additive result.

/// Starting score for every assessment.
pub const RISK_BASE: u8 = 20;

/// Absolute score for a blocklisted recipient.
pub const RISK_BLOCKLISTED: u8 = 95;

/// Absolute score for an allowlisted recipient.
pub const RISK_ALLOWLISTED: u8 = 5;

/// Added when the recipient address carries contract bytecode.
pub const RISK_CONTRACT_WEIGHT: u8 = 30;

/// Added when the recipient has no transaction history at all.
pub const RISK_NO_HISTORY_WEIGHT: u8 = 30;

/// Added when the recipient's earliest transaction is younger than
/// [`YOUNG_ADDRESS_WINDOW_SECS`].
pub const RISK_YOUNG_ADDRESS_WEIGHT: u8 = 20;

/// Age below which an address counts as "very new": 48 hours.
pub const YOUNG_ADDRESS_WINDOW_SECS: u64 = 48 * 60 * 60;

/// A send is refused when the recipient's score exceeds this.
pub const BLOCKING_THRESHOLD: u8 = 70;

/// Score reported when the screening service cannot be reached.
///
/// Below [`BLOCKING_THRESHOLD`]: an unreachable screen degrades
/// confidence, it does not block the user's own funds.
pub const NEUTRAL_SCORE: u8 = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_score_passes_the_gate() {
        assert!(NEUTRAL_SCORE <= BLOCKING_THRESHOLD);
    }

    #[test]
    fn blocklist_score_is_blocking() {
        assert!(RISK_BLOCKLISTED > BLOCKING_THRESHOLD);
    }

    #[test]
    fn allowlist_score_is_passing() {
        assert!(RISK_ALLOWLISTED <= BLOCKING_THRESHOLD);
    }

    #[test]
    fn max_additive_score_stays_in_range() {
        let total = RISK_BASE as u16
            + RISK_CONTRACT_WEIGHT as u16
            + RISK_NO_HISTORY_WEIGHT as u16
            + RISK_YOUNG_ADDRESS_WEIGHT as u16;
        assert!(total <= 100);
    }
}
