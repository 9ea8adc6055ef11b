// Tax module - Indian crypto tax calculations (30% on gains, 1% TDS)

pub mod calculator;
pub mod cost_basis;
pub mod manual;
pub mod models;

pub use calculator::{compute_tax, TaxCalculator};
pub use cost_basis::{assign_average_cost_basis, AverageCostMatcher};
pub use manual::{
    compute_manual, compute_manual_with_rates, validate_manual_entry, ManualEntry,
    ManualTransaction,
};
pub use models::{TaxRates, TaxResult, Transaction, TransactionType};
