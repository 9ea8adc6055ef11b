use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser)]
#[command(name = "ctc")]
#[command(version, about = "Crypto tax calculator with exchange CSV conversion")]
#[command(
    long_about = "Estimate Indian crypto taxes (30% on net gains plus 1% TDS on profitable sales) and convert exchange CSV exports into the canonical CTC format (date,type,asset,amount,price)."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Config file (defaults to $CTC_CONFIG or the user config directory)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Quick estimate for a single transaction value (no cost basis)
    Calculate {
        /// Transaction type: buy or sell
        #[arg(long = "type")]
        transaction_type: Option<String>,

        /// Transaction value
        #[arg(long)]
        amount: Option<String>,

        /// Transaction date (YYYY-MM-DD or MM/DD/YYYY)
        #[arg(long)]
        date: Option<String>,

        /// Also write an HTML report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Calculate tax for a CSV of transactions with date/type/asset/amount/price headers
    Tax {
        /// Path to the CSV file
        file: PathBuf,

        /// Also write an HTML report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Convert any exchange CSV export into CTC format
    Convert {
        /// Path to the CSV file
        file: PathBuf,

        /// Output path
        #[arg(short, long, default_value = "converted_ctc_format.csv")]
        output: PathBuf,

        /// Print the converted CSV to stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },

    /// Write a sample CSV in CTC format
    Sample {
        /// Output path
        #[arg(short, long, default_value = "sample_ctc_format.csv")]
        output: PathBuf,
    },
}
