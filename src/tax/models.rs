use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transaction type (buy or sell)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "buy",
            TransactionType::Sell => "sell",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only the exact tokens `buy` and `sell` are accepted, in any case.
impl FromStr for TransactionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(TransactionType::Buy),
            "sell" => Ok(TransactionType::Sell),
            _ => Err(()),
        }
    }
}

/// A single buy or sell of a crypto asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Ticker symbol, uppercase
    pub asset: String,
    pub amount: Decimal,
    /// Unit price at transaction time
    pub price: Decimal,
    /// Cumulative cost of the lot being sold (sells only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_basis: Option<Decimal>,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        transaction_type: TransactionType,
        asset: impl Into<String>,
        amount: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            date,
            transaction_type,
            asset: asset.into().to_uppercase(),
            amount,
            price,
            cost_basis: None,
        }
    }

    pub fn with_cost_basis(mut self, cost_basis: Decimal) -> Self {
        self.cost_basis = Some(cost_basis);
        self
    }

    /// Gross value of the transaction (`amount * price`), `None` on overflow
    pub fn total(&self) -> Option<Decimal> {
        self.amount.checked_mul(self.price)
    }

    /// Whether amount and price are both strictly positive
    pub fn is_well_formed(&self) -> bool {
        self.amount > Decimal::ZERO && self.price > Decimal::ZERO
    }
}

/// Tax rates applied by the calculator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxRates {
    /// Flat rate on taxable gains
    pub income_tax_rate: Decimal,
    /// Levy on gross proceeds of every profitable sale
    pub tds_rate: Decimal,
}

impl Default for TaxRates {
    fn default() -> Self {
        Self {
            income_tax_rate: Decimal::new(30, 2),
            tds_rate: Decimal::new(1, 2),
        }
    }
}

/// Outcome of a tax computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxResult {
    pub total_gains: Decimal,
    pub total_losses: Decimal,
    /// `max(0, total_gains - total_losses)`
    pub taxable_gains: Decimal,
    pub tax_amount: Decimal,
    pub tds_amount: Decimal,
    /// `tax_amount + tds_amount`
    pub total_tax: Decimal,
}

impl TaxResult {
    /// Derive the remaining fields from accumulated gains, losses and TDS.
    pub(crate) fn from_totals(
        total_gains: Decimal,
        total_losses: Decimal,
        tds_amount: Decimal,
        rates: &TaxRates,
    ) -> Self {
        let taxable_gains = (total_gains - total_losses).max(Decimal::ZERO);
        let tax_amount = taxable_gains.saturating_mul(rates.income_tax_rate);

        Self {
            total_gains,
            total_losses,
            taxable_gains,
            tax_amount,
            tds_amount,
            total_tax: tax_amount.saturating_add(tds_amount),
        }
    }
}
