//! Decimal SLC amount parsing and formatting.
//!
//! User input arrives as a decimal string ("1.5", "0.00000001"); the
//! protocol works in integer gills. Parsing rejects anything that is not
//! a strictly positive decimal with at most [`AMOUNT_DECIMALS`] places.

use crate::constants::{AMOUNT_DECIMALS, COIN};
use crate::error::AmountError;

/// Parse a decimal SLC string into gills.
pub fn parse_amount(s: &str) -> Result<u64, AmountError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }

    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(AmountError::NotANumber(s.to_string()));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(AmountError::NotANumber(s.to_string()));
    }
    if frac_part.len() > AMOUNT_DECIMALS {
        return Err(AmountError::TooManyDecimals(frac_part.len()));
    }

    let whole: u64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| AmountError::Overflow)?
    };

    // Right-pad the fractional digits to a full gill count.
    let mut frac: u64 = 0;
    if !frac_part.is_empty() {
        frac = frac_part.parse().map_err(|_| AmountError::Overflow)?;
        for _ in frac_part.len()..AMOUNT_DECIMALS {
            frac *= 10;
        }
    }

    let gills = whole
        .checked_mul(COIN)
        .and_then(|v| v.checked_add(frac))
        .ok_or(AmountError::Overflow)?;

    if gills == 0 {
        return Err(AmountError::NotPositive);
    }
    Ok(gills)
}

/// Format gills as a decimal SLC string, trimming trailing zeros.
pub fn format_amount(gills: u64) -> String {
    let whole = gills / COIN;
    let frac = gills % COIN;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_str = format!("{frac:08}");
    format!("{whole}.{}", frac_str.trim_end_matches('0'))
}
