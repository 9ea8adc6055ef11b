//! Routes parsed CLI commands to the library and prints the results.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::formatters::{
    format_conversion_summary, format_tax_report_json, format_tax_result_table,
};
use crate::cli::Commands;
use ctc::config::Config;
use ctc::importers::{load_transactions, read_csv_file, CtcConverter, SAMPLE_CTC_CSV};
use ctc::reports::TaxReport;
use ctc::tax::{
    assign_average_cost_basis, compute_manual_with_rates, validate_manual_entry, ManualEntry,
    TaxCalculator,
};

/// Route a parsed command to its handler
pub fn dispatch_command(command: Commands, config: &Config, json_output: bool) -> Result<()> {
    match command {
        Commands::Calculate {
            transaction_type,
            amount,
            date,
            report,
        } => {
            let entry = ManualEntry {
                transaction_type,
                amount,
                date,
            };
            dispatch_calculate(&entry, report.as_deref(), config, json_output)
        }
        Commands::Tax { file, report } => {
            dispatch_tax(&file, report.as_deref(), config, json_output)
        }
        Commands::Convert {
            file,
            output,
            stdout,
        } => dispatch_convert(&file, (!stdout).then_some(output), config),
        Commands::Sample { output } => dispatch_sample(&output),
    }
}

fn dispatch_calculate(
    entry: &ManualEntry,
    report_path: Option<&Path>,
    config: &Config,
    json_output: bool,
) -> Result<()> {
    let tx = validate_manual_entry(entry)?;
    let result = compute_manual_with_rates(&tx, &config.tax);
    let report = TaxReport::manual(tx, config.tax, result);

    emit_report(&report, "Manual Estimate", json_output);
    write_report(&report, report_path, json_output)
}

fn dispatch_tax(
    file: &Path,
    report_path: Option<&Path>,
    config: &Config,
    json_output: bool,
) -> Result<()> {
    let raw = read_csv_file(file)?;
    let transactions =
        load_transactions(&raw).with_context(|| format!("Failed to load {:?}", file))?;
    let transactions = assign_average_cost_basis(&transactions);

    let result = TaxCalculator::new(config.tax).compute(&transactions);
    let report = TaxReport::batch(&transactions, config.tax, result);

    let title = format!("Tax Summary ({} transactions)", transactions.len());
    emit_report(&report, &title, json_output);
    write_report(&report, report_path, json_output)
}

fn dispatch_convert(file: &Path, output: Option<PathBuf>, config: &Config) -> Result<()> {
    let raw = read_csv_file(file)?;
    let conversion = CtcConverter::new(config.converter.clone())
        .convert(&raw)
        .with_context(|| format!("Failed to convert {:?}", file))?;

    match output {
        Some(path) => {
            std::fs::write(&path, &conversion.csv)
                .with_context(|| format!("Failed to write {:?}", path))?;
            info!("Converted CSV written to {:?}", path);
            print!("{}", format_conversion_summary(&conversion, Some(&path)));
        }
        None => {
            // Keep stdout clean for piping
            print!("{}", conversion.csv);
            eprint!("{}", format_conversion_summary(&conversion, None));
        }
    }

    Ok(())
}

fn dispatch_sample(output: &Path) -> Result<()> {
    std::fs::write(output, SAMPLE_CTC_CSV)
        .with_context(|| format!("Failed to write {:?}", output))?;
    println!(
        "{} Sample CTC file written to {}",
        "✓".green().bold(),
        output.display()
    );
    Ok(())
}

fn emit_report(report: &TaxReport, title: &str, json_output: bool) {
    if json_output {
        println!("{}", format_tax_report_json(report));
    } else {
        print!(
            "{}",
            format_tax_result_table(title, &report.result, &report.rates)
        );
    }
}

fn write_report(report: &TaxReport, path: Option<&Path>, json_output: bool) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    report.write_html(path)?;
    if !json_output {
        println!("\n{} Report written to {}", "✓".green().bold(), path.display());
    }
    Ok(())
}
