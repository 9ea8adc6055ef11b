//! Manual single-entry mode
//!
//! The manual calculator takes one transaction value with no cost basis and
//! treats the whole amount as a gain when selling and as a loss when buying.
//! It is a rough estimate, not a realized-gain calculation, and is kept apart
//! from the batch calculator on purpose.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::models::{TaxRates, TaxResult, TransactionType};
use crate::error::CtcError;
use crate::utils::{dates::parse_date, parse_decimal};

/// Raw, unvalidated manual input as typed by the user
#[derive(Debug, Clone, Default)]
pub struct ManualEntry {
    pub transaction_type: Option<String>,
    pub amount: Option<String>,
    pub date: Option<String>,
}

/// A validated manual entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ManualTransaction {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Transaction value
    pub amount: Decimal,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, CtcError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CtcError::ValidationError(format!("missing required field '{}'", field)))
}

/// Validate a manual entry before any computation runs.
pub fn validate_manual_entry(entry: &ManualEntry) -> Result<ManualTransaction, CtcError> {
    let type_text = required(&entry.transaction_type, "type")?;
    let transaction_type: TransactionType = type_text.parse().map_err(|_| {
        CtcError::ValidationError(format!(
            "invalid type '{}': expected 'buy' or 'sell'",
            type_text
        ))
    })?;

    let amount_text = required(&entry.amount, "amount")?;
    let amount = parse_decimal(amount_text)
        .ok_or_else(|| CtcError::ValidationError(format!("invalid amount '{}'", amount_text)))?;
    if amount <= Decimal::ZERO {
        return Err(CtcError::ValidationError(format!(
            "amount must be positive, got {}",
            amount_text
        )));
    }

    let date_text = required(&entry.date, "date")?;
    let date = parse_date(date_text)
        .ok_or_else(|| CtcError::ValidationError(format!("invalid date '{}'", date_text)))?;

    Ok(ManualTransaction {
        date,
        transaction_type,
        amount,
    })
}

/// Estimate tax for a single manual entry with the default rates.
pub fn compute_manual(tx: &ManualTransaction) -> TaxResult {
    compute_manual_with_rates(tx, &TaxRates::default())
}

pub fn compute_manual_with_rates(tx: &ManualTransaction, rates: &TaxRates) -> TaxResult {
    let (total_gains, total_losses) = match tx.transaction_type {
        TransactionType::Sell => (tx.amount, Decimal::ZERO),
        TransactionType::Buy => (Decimal::ZERO, tx.amount),
    };
    // TDS here is charged on the gain itself, there being no separate proceeds
    let tds_amount = total_gains.saturating_mul(rates.tds_rate);

    TaxResult::from_totals(total_gains, total_losses, tds_amount, rates)
}
