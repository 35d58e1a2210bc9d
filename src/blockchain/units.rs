// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Conversion between smallest-unit amounts and decimal display strings.

use alloy::primitives::U256;

/// Errors from parsing a decimal quantity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitsError {
    #[error("Empty amount")]
    Empty,

    #[error("Invalid amount format: {0}")]
    InvalidFormat(String),

    #[error("Amount overflow: {0}")]
    Overflow(String),
}

/// Parse a human-readable amount to the token's smallest unit.
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "1.5", ".25", "3.")
/// * `decimals` - Number of decimals (18 for ETH, 6 for USDC)
///
/// Fraction digits beyond `decimals` are truncated, not rounded.
pub fn parse_display_qty(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(UnitsError::InvalidFormat(amount.to_string()));
    }

    let decimals = decimals as usize;
    let fraction = &fraction[..fraction.len().min(decimals)];
    // Pad with zeros to match decimals
    let scaled = format!("{whole}{fraction:0<decimals$}");
    let digits = scaled.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 10).map_err(|_| UnitsError::Overflow(amount.to_string()))
}

/// Format a smallest-unit amount as a decimal string at full precision.
pub fn format_display_qty(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }
    if decimals == 0 {
        return amount.to_string();
    }

    let digits = amount.to_string();
    let width = decimals as usize;
    let padded = format!("{digits:0>width$}", width = width + 1);
    let (whole, remainder) = padded.split_at(padded.len() - width);

    let trimmed = remainder.trim_end_matches('0');
    if trimmed.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{trimmed}")
    }
}
