use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::models::{TaxRates, TaxResult, Transaction, TransactionType};

/// Compute realized gains and tax for a batch of transactions with the
/// default rates (30% on taxable gains, 1% TDS).
pub fn compute_tax(transactions: &[Transaction]) -> TaxResult {
    TaxCalculator::default().compute(transactions)
}

/// Batch tax calculator
///
/// Only sells contribute. Each sell needs a lot cost basis; sells without one
/// (or with a non-positive amount or price) are left out of the totals.
#[derive(Debug, Clone, Default)]
pub struct TaxCalculator {
    rates: TaxRates,
}

impl TaxCalculator {
    pub fn new(rates: TaxRates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &TaxRates {
        &self.rates
    }

    pub fn compute(&self, transactions: &[Transaction]) -> TaxResult {
        let mut ordered: Vec<&Transaction> = transactions.iter().collect();
        // Stable: same-day transactions keep their input order
        ordered.sort_by_key(|tx| tx.date);

        let mut total_gains = Decimal::ZERO;
        let mut total_losses = Decimal::ZERO;
        let mut tds_amount = Decimal::ZERO;

        for tx in ordered {
            if tx.transaction_type != TransactionType::Sell {
                continue;
            }

            let Some(cost_basis) = tx.cost_basis else {
                debug!("Excluding {} sell on {}: no cost basis", tx.asset, tx.date);
                continue;
            };
            if !tx.is_well_formed() {
                debug!(
                    "Excluding {} sell on {}: amount and price must be positive",
                    tx.asset, tx.date
                );
                continue;
            }

            // amount * (cost_basis / amount) is the lot cost basis itself
            let accumulated = tx.total().and_then(|sale_value| {
                let gain = sale_value.checked_sub(cost_basis)?;
                if gain > Decimal::ZERO {
                    let tds = sale_value.checked_mul(self.rates.tds_rate)?;
                    Some((
                        total_gains.checked_add(gain)?,
                        total_losses,
                        tds_amount.checked_add(tds)?,
                    ))
                } else {
                    Some((total_gains, total_losses.checked_add(gain.abs())?, tds_amount))
                }
            });

            match accumulated {
                Some(totals) => (total_gains, total_losses, tds_amount) = totals,
                None => warn!(
                    "Excluding {} sell on {}: values too large to total",
                    tx.asset, tx.date
                ),
            }
        }

        TaxResult::from_totals(total_gains, total_losses, tds_amount, &self.rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sell(d: NaiveDate, amount: Decimal, price: Decimal, cost_basis: Decimal) -> Transaction {
        Transaction::new(d, TransactionType::Sell, "BTC", amount, price)
            .with_cost_basis(cost_basis)
    }

    #[test]
    fn test_profitable_sell() {
        let txs = vec![sell(date(2024, 2, 1), dec!(1), dec!(60000), dec!(50000))];
        let result = compute_tax(&txs);

        assert_eq!(result.total_gains, dec!(10000));
        assert_eq!(result.total_losses, Decimal::ZERO);
        assert_eq!(result.taxable_gains, dec!(10000));
        assert_eq!(result.tds_amount, dec!(600));
        assert_eq!(result.tax_amount, dec!(3000));
        assert_eq!(result.total_tax, dec!(3600));
    }

    #[test]
    fn test_losing_sell_has_no_tds() {
        let txs = vec![sell(date(2024, 2, 1), dec!(2), dec!(100), dec!(500))];
        let result = compute_tax(&txs);

        assert_eq!(result.total_gains, Decimal::ZERO);
        assert_eq!(result.total_losses, dec!(300));
        assert_eq!(result.tds_amount, Decimal::ZERO);
        assert_eq!(result.total_tax, Decimal::ZERO);
    }

    #[test]
    fn test_losses_offset_gains() {
        let txs = vec![
            sell(date(2024, 3, 1), dec!(1), dec!(1000), dec!(400)),
            sell(date(2024, 1, 1), dec!(1), dec!(100), dec!(300)),
        ];
        let result = compute_tax(&txs);

        assert_eq!(result.total_gains, dec!(600));
        assert_eq!(result.total_losses, dec!(200));
        assert_eq!(result.taxable_gains, dec!(400));
        assert_eq!(result.tax_amount, dec!(120));
        // TDS is on gross proceeds of the profitable sale, not on the gain
        assert_eq!(result.tds_amount, dec!(10));
        assert_eq!(result.total_tax, dec!(130));
    }

    #[test]
    fn test_buys_and_malformed_sells_are_excluded() {
        let txs = vec![
            Transaction::new(
                date(2024, 1, 1),
                TransactionType::Buy,
                "BTC",
                dec!(1),
                dec!(50000),
            ),
            Transaction::new(
                date(2024, 1, 2),
                TransactionType::Sell,
                "BTC",
                dec!(1),
                dec!(60000),
            ),
            sell(date(2024, 1, 3), dec!(0), dec!(60000), dec!(1)),
            sell(date(2024, 1, 4), dec!(1), dec!(-5), dec!(1)),
        ];
        assert_eq!(compute_tax(&txs), TaxResult::default());
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(compute_tax(&[]), TaxResult::default());
    }

    #[test]
    fn test_custom_rates() {
        let calculator = TaxCalculator::new(TaxRates {
            income_tax_rate: dec!(0.20),
            tds_rate: dec!(0),
        });
        let txs = vec![sell(date(2024, 2, 1), dec!(1), dec!(60000), dec!(50000))];
        let result = calculator.compute(&txs);

        assert_eq!(result.tax_amount, dec!(2000));
        assert_eq!(result.tds_amount, Decimal::ZERO);
        assert_eq!(result.total_tax, dec!(2000));
    }

    #[test]
    fn test_oversized_sells_are_excluded() {
        let huge = Decimal::new(1_000_000_000_000_000, 0);
        let txs = vec![
            sell(date(2024, 2, 1), dec!(1), dec!(60000), dec!(50000)),
            // amount * price overflows
            sell(date(2024, 2, 2), huge, huge, dec!(1)),
            // gain alone fits but pushes the running total over
            sell(date(2024, 2, 3), dec!(1), Decimal::MAX, dec!(0)),
        ];
        let result = compute_tax(&txs);

        assert_eq!(result.total_gains, dec!(10000));
        assert_eq!(result.tds_amount, dec!(600));
        assert_eq!(result.total_tax, dec!(3600));
    }
}
