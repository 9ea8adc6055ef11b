//! Utility functions for formatting and common operations
//!
//! This module provides centralized formatting utilities for consistent
//! display of currency and decimal values throughout the application.

pub mod dates;

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Round half away from zero to two decimal places.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a value with exactly two decimals and no grouping: "1234.50"
pub fn format_fixed2(value: Decimal) -> String {
    format!("{:.2}", round2(value))
}

/// Parse a finite decimal number, accepting plain and scientific notation.
///
/// Returns `None` for empty strings, `NaN`, `Infinity` and anything with
/// trailing garbage.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .ok()
        .or_else(|| Decimal::from_scientific(text).ok())
}

/// Format as Indian Rupee with symbol: "₹1,234.56"
///
/// Thousands are separated by `,`; the sign goes before the symbol.
///
/// # Examples
/// ```
/// use ctc::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1234.56)), "₹1,234.56");
/// assert_eq!(format_currency(dec!(-500)), "-₹500.00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    let is_negative = value < Decimal::ZERO;
    let formatted = format_fixed2(value.abs());
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    // Add thousands separators (,) to integer part
    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    format!("{}₹{}.{}", sign, with_separators, decimal_part)
}
