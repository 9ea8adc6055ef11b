//! Heuristic converter from arbitrary exchange CSV exports to CTC format
//!
//! Exchange exports disagree on column order and header names, so headers are
//! ignored. Every field of every row is classified by its shape instead:
//!
//! | shape                                   | role             |
//! |-----------------------------------------|------------------|
//! | contains `YYYY-MM-DD` or `MM/DD/YYYY`   | date             |
//! | exactly `buy` / `sell` (any case)       | type             |
//! | ASCII letters only                      | asset            |
//! | finite decimal number                   | amount, price    |
//!
//! The leftmost field of each shape wins and a field fills at most one role.
//! The amount is the leftmost number and the price the first number to its
//! right with a different value. A `buy`/`sell` token is never taken as the
//! asset. Amount and price must be positive before rounding.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use super::read_csv_input;
use crate::error::CtcError;
use crate::tax::TransactionType;
use crate::utils::dates::{format_iso, looks_like_date, parse_date};
use crate::utils::{format_fixed2, parse_decimal, round2};

/// Header of the canonical CTC format
pub const CTC_HEADER: &str = "date,type,asset,amount,price";

/// Example file in CTC format
pub const SAMPLE_CTC_CSV: &str = "date,type,asset,amount,price
2024-01-01,buy,BTC,0.5,50000
2024-02-01,sell,BTC,0.2,60000
2024-03-01,buy,ETH,2,30000
2024-04-01,sell,ETH,1,35000
";

/// Values substituted when a row has no recognisable date or asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterDefaults {
    pub default_date: NaiveDate,
    pub default_asset: String,
}

impl Default for ConverterDefaults {
    fn default() -> Self {
        Self {
            default_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            default_asset: "BTC".to_string(),
        }
    }
}

/// A converted row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtcRow {
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    pub asset: String,
    /// Rounded to two decimals
    pub amount: Decimal,
    /// Rounded to two decimals
    pub price: Decimal,
}

impl CtcRow {
    fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{}",
            format_iso(self.date),
            self.transaction_type.as_str(),
            self.asset,
            format_fixed2(self.amount),
            format_fixed2(self.price)
        )
    }
}

/// Why a data row was left out of the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingType,
    MissingAmount,
    MissingPrice,
    NonPositiveAmount,
    NonPositivePrice,
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingType => f.write_str("no valid transaction type found"),
            SkipReason::MissingAmount => f.write_str("no valid amount found"),
            SkipReason::MissingPrice => f.write_str("no valid price found"),
            SkipReason::NonPositiveAmount => f.write_str("amount must be positive"),
            SkipReason::NonPositivePrice => f.write_str("price must be positive"),
            SkipReason::Unreadable(e) => write!(f, "unreadable row: {}", e),
        }
    }
}

/// A data row that was dropped, with its line number in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: SkipReason,
}

/// Result of a conversion
#[derive(Debug, Clone)]
pub struct Conversion {
    /// CTC-format CSV text, header included
    pub csv: String,
    pub rows: Vec<CtcRow>,
    pub skipped: Vec<SkippedRow>,
}

/// Convert CSV text to CTC format with the default fallbacks.
pub fn normalize_to_ctc_csv(raw_csv: &str) -> Result<String, CtcError> {
    CtcConverter::default()
        .convert(raw_csv)
        .map(|conversion| conversion.csv)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldShape {
    Date,
    Side(TransactionType),
    Alpha,
    Number(Decimal),
    Other,
}

fn classify(field: &str) -> FieldShape {
    if looks_like_date(field) {
        FieldShape::Date
    } else if let Ok(side) = field.parse::<TransactionType>() {
        FieldShape::Side(side)
    } else if !field.is_empty() && field.chars().all(|c| c.is_ascii_alphabetic()) {
        FieldShape::Alpha
    } else if let Some(number) = parse_decimal(field) {
        FieldShape::Number(number)
    } else {
        FieldShape::Other
    }
}

/// Looser type detection used only when no field is exactly `buy`/`sell`.
///
/// Every field is checked and the rightmost match wins.
fn fallback_side(fields: &[&str]) -> Option<(usize, TransactionType)> {
    fields.iter().enumerate().rev().find_map(|(idx, field)| {
        let lower = field.to_lowercase();
        if lower.contains("buy") || lower.contains("purchase") {
            Some((idx, TransactionType::Buy))
        } else if lower.contains("sell") || lower.contains("sale") {
            Some((idx, TransactionType::Sell))
        } else {
            None
        }
    })
}

/// Roles claimed by the fields of one row
#[derive(Debug, Default, PartialEq)]
struct Claims<'a> {
    date: Option<&'a str>,
    side: Option<TransactionType>,
    asset: Option<&'a str>,
    amount: Option<Decimal>,
    price: Option<Decimal>,
}

fn claim_fields<'a>(fields: &[&'a str]) -> Claims<'a> {
    let shapes: Vec<FieldShape> = fields.iter().map(|f| classify(f)).collect();

    let date = shapes
        .iter()
        .position(|s| *s == FieldShape::Date)
        .map(|idx| fields[idx]);

    let mut side = shapes.iter().find_map(|s| match s {
        FieldShape::Side(side) => Some(*side),
        _ => None,
    });

    let alphabetic: Vec<usize> = shapes
        .iter()
        .enumerate()
        .filter(|(_, s)| **s == FieldShape::Alpha)
        .map(|(idx, _)| idx)
        .collect();
    let mut asset_idx = alphabetic.first().copied();

    let mut numbers = shapes.iter().filter_map(|s| match s {
        FieldShape::Number(n) => Some(*n),
        _ => None,
    });
    let amount = numbers.next();
    // Exports often repeat the quantity (filled/executed); skip repeats of it
    let price = amount.and_then(|amount| numbers.find(|n| *n != amount));

    if side.is_none() {
        if let Some((idx, fallback)) = fallback_side(fields) {
            side = Some(fallback);
            // A field such as "Purchase" cannot be both the type and the asset
            if asset_idx == Some(idx) {
                asset_idx = alphabetic.get(1).copied();
            }
        }
    }

    Claims {
        date,
        side,
        asset: asset_idx.map(|idx| fields[idx]),
        amount,
        price,
    }
}

/// Converter from arbitrary exchange CSV exports to CTC format
#[derive(Debug, Clone, Default)]
pub struct CtcConverter {
    defaults: ConverterDefaults,
}

impl CtcConverter {
    pub fn new(defaults: ConverterDefaults) -> Self {
        Self { defaults }
    }

    /// Convert CSV text. The first non-blank line is treated as a header and
    /// ignored. Rows keep their input order; unusable rows are skipped.
    pub fn convert(&self, raw_csv: &str) -> Result<Conversion, CtcError> {
        let input = read_csv_input(raw_csv)?;

        let mut rows = Vec::new();
        let mut skipped = Vec::new();

        for input_row in input.rows {
            let line = input_row.line;
            let outcome = match input_row.record {
                Ok(record) => {
                    let fields: Vec<&str> = record.iter().collect();
                    self.convert_row(&fields, line)
                }
                Err(e) => Err(SkipReason::Unreadable(e)),
            };

            match outcome {
                Ok(row) => rows.push(row),
                Err(reason) => {
                    warn!("Row {}: {}, skipping row", line, reason);
                    skipped.push(SkippedRow { line, reason });
                }
            }
        }

        info!(
            "Converted {} rows to CTC format ({} skipped)",
            rows.len(),
            skipped.len()
        );

        let mut csv = String::from(CTC_HEADER);
        csv.push('\n');
        for row in &rows {
            csv.push_str(&row.to_csv_line());
            csv.push('\n');
        }

        Ok(Conversion { csv, rows, skipped })
    }

    fn convert_row(&self, fields: &[&str], line: usize) -> Result<CtcRow, SkipReason> {
        let claims = claim_fields(fields);

        let transaction_type = claims.side.ok_or(SkipReason::MissingType)?;
        let amount = claims.amount.ok_or(SkipReason::MissingAmount)?;
        let price = claims.price.ok_or(SkipReason::MissingPrice)?;

        if amount <= Decimal::ZERO {
            return Err(SkipReason::NonPositiveAmount);
        }
        if price <= Decimal::ZERO {
            return Err(SkipReason::NonPositivePrice);
        }
        let amount = round2(amount);
        let price = round2(price);

        let date = match claims.date {
            Some(text) => parse_date(text).unwrap_or_else(|| {
                warn!("Row {}: unparseable date '{}', using default", line, text);
                self.defaults.default_date
            }),
            None => {
                warn!("Row {}: no valid date found, using default", line);
                self.defaults.default_date
            }
        };

        let asset = match claims.asset {
            Some(asset) => asset.to_uppercase(),
            None => {
                warn!("Row {}: no valid asset found, using default", line);
                self.defaults.default_asset.to_uppercase()
            }
        };

        Ok(CtcRow {
            date,
            transaction_type,
            asset,
            amount,
            price,
        })
    }
}
