// Reports module - tax report generation

pub mod tax_report;

pub use tax_report::{BatchSummary, ReportBasis, TaxReport};
