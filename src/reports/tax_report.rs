//! Downloadable tax report
//!
//! A [`TaxReport`] is built explicitly by the caller from a finished
//! computation and handed to the renderer.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::tax::{ManualTransaction, TaxRates, TaxResult, Transaction, TransactionType};
use crate::utils::{dates::format_iso, format_currency, format_fixed2};

/// Overview of the transactions behind a batch computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub transactions: usize,
    pub sells: usize,
    /// Sells that carried a cost basis and were counted
    pub priced_sells: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl BatchSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let sells: Vec<&Transaction> = transactions
            .iter()
            .filter(|tx| tx.transaction_type == TransactionType::Sell)
            .collect();

        Self {
            transactions: transactions.len(),
            sells: sells.len(),
            priced_sells: sells.iter().filter(|tx| tx.cost_basis.is_some()).count(),
            first_date: transactions.iter().map(|tx| tx.date).min(),
            last_date: transactions.iter().map(|tx| tx.date).max(),
        }
    }
}

/// What a report's result was computed from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ReportBasis {
    Manual(ManualTransaction),
    Batch(BatchSummary),
}

/// A tax computation ready to be rendered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxReport {
    pub generated_on: NaiveDate,
    pub rates: TaxRates,
    pub basis: ReportBasis,
    pub result: TaxResult,
}

impl TaxReport {
    pub fn new(basis: ReportBasis, rates: TaxRates, result: TaxResult) -> Self {
        Self {
            generated_on: Local::now().date_naive(),
            rates,
            basis,
            result,
        }
    }

    pub fn manual(tx: ManualTransaction, rates: TaxRates, result: TaxResult) -> Self {
        Self::new(ReportBasis::Manual(tx), rates, result)
    }

    pub fn batch(transactions: &[Transaction], rates: TaxRates, result: TaxResult) -> Self {
        Self::new(
            ReportBasis::Batch(BatchSummary::from_transactions(transactions)),
            rates,
            result,
        )
    }

    /// Render the report as a standalone HTML document
    pub fn render_html(&self) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<title>Crypto Tax Report</title>\n");
        html.push_str(STYLE);
        html.push_str("</head>\n<body>\n");

        html.push_str("<div class=\"header\">\n<h1>Crypto Tax Report</h1>\n");
        html.push_str(&format!(
            "<p>Generated on {}</p>\n</div>\n",
            format_iso(self.generated_on)
        ));

        html.push_str(&self.render_basis());

        let rate_pct = |rate: Decimal| format_fixed2(rate.saturating_mul(Decimal::ONE_HUNDRED));
        let tax_label = format!("Tax Amount ({}%)", rate_pct(self.rates.income_tax_rate));
        let tds_label = format!("TDS Amount ({}%)", rate_pct(self.rates.tds_rate));

        let r = &self.result;
        let items = [
            ("Total Gains", r.total_gains, "positive"),
            ("Total Losses", r.total_losses, "negative"),
            ("Taxable Gains", r.taxable_gains, "positive"),
            (tax_label.as_str(), r.tax_amount, "tax"),
            (tds_label.as_str(), r.tds_amount, "tax"),
            ("Total Tax", r.total_tax, "tax"),
        ];

        html.push_str("<div class=\"results\">\n");
        for (label, value, class) in items {
            html.push_str(&result_item(label, value, class));
        }
        html.push_str("</div>\n");

        html.push_str("<div class=\"footer\">\n");
        html.push_str("<p>This report is generated by Crypto Tax Calculator</p>\n");
        html.push_str("<p>For official tax filing, please consult with a tax professional</p>\n");
        html.push_str("</div>\n</body>\n</html>\n");

        html
    }

    fn render_basis(&self) -> String {
        match &self.basis {
            ReportBasis::Manual(tx) => format!(
                "<div class=\"transaction\">\n<h2>Transaction Details</h2>\n\
                 <p><strong>Date:</strong> {}</p>\n\
                 <p><strong>Type:</strong> {}</p>\n\
                 <p><strong>Amount:</strong> {}</p>\n</div>\n",
                format_iso(tx.date),
                tx.transaction_type.as_str().to_uppercase(),
                escape_html(&format_currency(tx.amount))
            ),
            ReportBasis::Batch(summary) => {
                let period = match (summary.first_date, summary.last_date) {
                    (Some(first), Some(last)) => {
                        format!("{} to {}", format_iso(first), format_iso(last))
                    }
                    _ => "n/a".to_string(),
                };
                format!(
                    "<div class=\"transaction\">\n<h2>Transactions</h2>\n\
                     <p><strong>Period:</strong> {}</p>\n\
                     <p><strong>Transactions:</strong> {}</p>\n\
                     <p><strong>Sales counted:</strong> {} of {}</p>\n</div>\n",
                    period, summary.transactions, summary.priced_sells, summary.sells
                )
            }
        }
    }

    /// Write the HTML report to `path`
    pub fn write_html<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.render_html())
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        info!("Tax report written to {:?}", path);
        Ok(())
    }
}

const STYLE: &str = "<style>
body { font-family: Arial, sans-serif; padding: 20px; }
.header { text-align: center; margin-bottom: 20px; }
.transaction { margin-bottom: 20px; }
.results { display: grid; grid-template-columns: repeat(2, 1fr); gap: 10px; margin-bottom: 20px; }
.result-item { padding: 10px; border: 1px solid #ddd; border-radius: 5px; }
.result-label { font-weight: bold; color: #409140; }
.result-value { font-weight: bold; }
.positive { color: green; }
.negative { color: red; }
.tax { color: #409140; }
</style>
";

fn result_item(label: &str, value: Decimal, class: &str) -> String {
    format!(
        "<div class=\"result-item\">\n<div class=\"result-label\">{}</div>\n\
         <div class=\"result-value {}\">{}</div>\n</div>\n",
        escape_html(label),
        class,
        escape_html(&format_currency(value))
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
