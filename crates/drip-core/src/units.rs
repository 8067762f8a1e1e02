//! Ether/wei conversion.
//!
//! Faucet amounts are configured as decimal ether strings ("0.1") but all
//! transaction values are wei. `u128` comfortably holds any value the
//! faucet will ever move (max ~3.4e20 ETH).

use crate::constants::{ETH_DECIMALS, WEI_PER_ETH};
use crate::error::UnitsError;

/// Parse a decimal ether string into wei.
///
/// Accepts an integer part, optionally followed by `.` and up to 18
/// fractional digits: `"1"`, `"0.1"`, `"1.5"`. Signs, exponents, and
/// thousands separators are rejected.
pub fn parse_ether(s: &str) -> Result<u128, UnitsError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(UnitsError::Empty);
    }
    if frac_part.len() > ETH_DECIMALS as usize {
        return Err(UnitsError::TooManyDecimals(frac_part.len()));
    }

    let mut wei: u128 = 0;
    for c in int_part.chars() {
        let digit = c.to_digit(10).ok_or(UnitsError::InvalidDigit(c))? as u128;
        wei = wei
            .checked_mul(10)
            .and_then(|w| w.checked_add(digit))
            .ok_or(UnitsError::Overflow)?;
    }
    wei = wei.checked_mul(WEI_PER_ETH).ok_or(UnitsError::Overflow)?;

    let mut frac: u128 = 0;
    for c in frac_part.chars() {
        let digit = c.to_digit(10).ok_or(UnitsError::InvalidDigit(c))? as u128;
        frac = frac * 10 + digit;
    }
    // Scale the fraction up to 18 places.
    for _ in 0..(ETH_DECIMALS as usize - frac_part.len()) {
        frac *= 10;
    }

    wei.checked_add(frac).ok_or(UnitsError::Overflow)
}

/// Format a wei amount as a decimal ether string, trimming trailing zeros.
pub fn format_ether(wei: u128) -> String {
    let whole = wei / WEI_PER_ETH;
    let frac = wei % WEI_PER_ETH;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_str = format!("{frac:018}");
    format!("{whole}.{}", frac_str.trim_end_matches('0'))
}
