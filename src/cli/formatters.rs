//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of tax computation from presentation.

use colored::Colorize;
use ctc::importers::Conversion;
use ctc::reports::TaxReport;
use ctc::tax::{TaxRates, TaxResult};
use ctc::utils::{format_currency, format_fixed2};
use rust_decimal::Decimal;
use std::path::Path;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

/// Format a tax report for JSON output
pub fn format_tax_report_json(report: &TaxReport) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format a tax result for terminal table output
pub fn format_tax_result_table(title: &str, result: &TaxResult, rates: &TaxRates) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{} {}\n\n", "📊".cyan().bold(), title));

    #[derive(Tabled)]
    struct ResultRow {
        #[tabled(rename = "Item")]
        label: String,
        #[tabled(rename = "Amount")]
        amount: String,
    }

    let pct = |rate: Decimal| {
        format!("{}%", format_fixed2(rate.saturating_mul(Decimal::ONE_HUNDRED)))
    };

    let rows = vec![
        ResultRow {
            label: "Total Gains".to_string(),
            amount: format_currency(result.total_gains).green().to_string(),
        },
        ResultRow {
            label: "Total Losses".to_string(),
            amount: format_currency(result.total_losses).red().to_string(),
        },
        ResultRow {
            label: "Taxable Gains".to_string(),
            amount: format_currency(result.taxable_gains).green().to_string(),
        },
        ResultRow {
            label: format!("Tax Amount ({})", pct(rates.income_tax_rate)),
            amount: format_currency(result.tax_amount).yellow().to_string(),
        },
        ResultRow {
            label: format!("TDS Amount ({})", pct(rates.tds_rate)),
            amount: format_currency(result.tds_amount).yellow().to_string(),
        },
        ResultRow {
            label: "Total Tax".to_string(),
            amount: format_currency(result.total_tax).yellow().bold().to_string(),
        },
    ];

    let table = Table::new(rows)
        .with(Style::modern())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();

    output.push_str(&table);
    output.push('\n');

    output
}

/// Format the outcome of a CSV conversion
pub fn format_conversion_summary(conversion: &Conversion, output_path: Option<&Path>) -> String {
    let mut output = format!(
        "\n{} Converted {} rows to CTC format\n",
        "✓".green().bold(),
        conversion.rows.len()
    );

    if !conversion.skipped.is_empty() {
        output.push_str(&format!(
            "  Skipped: {}\n",
            conversion.skipped.len().to_string().yellow()
        ));
        for skipped in &conversion.skipped {
            output.push_str(&format!("    line {}: {}\n", skipped.line, skipped.reason));
        }
    }

    if let Some(path) = output_path {
        output.push_str(&format!("  Written to: {}\n", path.display()));
    }

    output
}
