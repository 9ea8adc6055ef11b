//! Header-mapped transaction loader
//!
//! Unlike the CTC converter, this loader trusts the header row: each column
//! is located by keywords in its header and every row must carry a valid
//! value in each required column.

use csv::StringRecord;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::read_csv_input;
use crate::error::CtcError;
use crate::tax::{Transaction, TransactionType};
use crate::utils::{dates::parse_date, parse_decimal};

/// Column indices found in the header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub date: usize,
    pub transaction_type: usize,
    pub asset: usize,
    pub amount: usize,
    pub price: usize,
    pub cost_basis: Option<usize>,
}

fn first_header_containing(headers: &[String], keywords: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| keywords.iter().any(|k| h.contains(k)))
}

impl ColumnMapping {
    /// Locate columns by header keywords; the first matching header wins.
    pub fn from_headers(headers: &StringRecord) -> Result<Self, CtcError> {
        let headers: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

        let missing = || {
            CtcError::FormatError(
                "Missing required columns in CSV file. Required columns: date, type, asset, amount, price"
                    .to_string(),
            )
        };

        Ok(Self {
            date: first_header_containing(&headers, &["date", "time"]).ok_or_else(missing)?,
            transaction_type: first_header_containing(&headers, &["type", "side"])
                .ok_or_else(missing)?,
            asset: first_header_containing(&headers, &["asset", "coin", "currency"])
                .ok_or_else(missing)?,
            amount: first_header_containing(&headers, &["amount", "quantity", "size"])
                .ok_or_else(missing)?,
            price: first_header_containing(&headers, &["price", "rate", "value"])
                .ok_or_else(missing)?,
            cost_basis: first_header_containing(&headers, &["cost"]),
        })
    }
}

fn parse_row(record: &StringRecord, mapping: &ColumnMapping) -> Result<Transaction, String> {
    let field = |idx: usize| record.get(idx).unwrap_or("").trim();

    let date_text = field(mapping.date);
    let date = parse_date(date_text).ok_or_else(|| format!("invalid date '{}'", date_text))?;

    let type_text = field(mapping.transaction_type);
    let transaction_type: TransactionType = type_text
        .parse()
        .map_err(|_| format!("invalid type '{}'", type_text))?;

    let asset = field(mapping.asset);
    if asset.is_empty() {
        return Err("missing asset".to_string());
    }

    let amount = parse_decimal(field(mapping.amount))
        .filter(|a| *a > Decimal::ZERO)
        .ok_or_else(|| format!("invalid amount '{}'", field(mapping.amount)))?;

    let price = parse_decimal(field(mapping.price))
        .filter(|p| *p > Decimal::ZERO)
        .ok_or_else(|| format!("invalid price '{}'", field(mapping.price)))?;

    let mut tx = Transaction::new(date, transaction_type, asset, amount, price);
    if tx.total().is_none() {
        return Err(format!("amount {} * price {} is too large", amount, price));
    }
    // Cost basis only matters for sells; blank or negative values are ignored
    if transaction_type == TransactionType::Sell {
        if let Some(cost_basis) = mapping
            .cost_basis
            .and_then(|idx| parse_decimal(field(idx)))
            .filter(|c| *c >= Decimal::ZERO)
        {
            tx = tx.with_cost_basis(cost_basis);
        }
    }

    Ok(tx)
}

/// Load transactions from CSV text with a header row.
///
/// Rows with an invalid date, type, amount or price are skipped. Fails when
/// required columns are missing or no valid row remains.
pub fn load_transactions(raw_csv: &str) -> Result<Vec<Transaction>, CtcError> {
    let input = read_csv_input(raw_csv)?;
    let mapping = ColumnMapping::from_headers(&input.headers)?;
    debug!("Column mapping: {:?}", mapping);

    let mut transactions = Vec::new();
    for row in input.rows {
        let parsed = row.record.and_then(|record| parse_row(&record, &mapping));
        match parsed {
            Ok(tx) => transactions.push(tx),
            Err(e) => warn!("Skipping invalid transaction at line {}: {}", row.line, e),
        }
    }

    if transactions.is_empty() {
        return Err(CtcError::FormatError(
            "No valid transactions found in the CSV file. Please check the format.".to_string(),
        ));
    }

    info!("Loaded {} transactions", transactions.len());
    Ok(transactions)
}
