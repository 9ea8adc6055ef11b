//! ctc - crypto tax calculator
//!
//! This library computes simplified Indian crypto taxes (30% on net gains plus
//! 1% TDS on profitable sales) and converts arbitrary exchange CSV exports
//! into the canonical CTC format.

pub mod config;
pub mod error;
pub mod importers;
pub mod reports;
pub mod tax;
pub mod utils;
