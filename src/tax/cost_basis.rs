use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::models::{Transaction, TransactionType};

/// Average-cost matcher for calculating cost basis of sales of one asset
#[derive(Debug, Clone)]
pub struct AverageCostMatcher {
    total_quantity: Decimal,
    total_cost: Decimal,
}

impl AverageCostMatcher {
    pub fn new() -> Self {
        Self {
            total_quantity: Decimal::ZERO,
            total_cost: Decimal::ZERO,
        }
    }

    /// Add a purchase to the running position. Non-buys are ignored.
    ///
    /// Fails, leaving the position unchanged, when the purchase would
    /// overflow the running totals.
    pub fn add_purchase(&mut self, tx: &Transaction) -> Result<()> {
        if tx.transaction_type != TransactionType::Buy {
            return Ok(());
        }

        let totals = tx.total().and_then(|value| {
            Some((
                self.total_quantity.checked_add(tx.amount)?,
                self.total_cost.checked_add(value)?,
            ))
        });
        let Some((quantity, cost)) = totals else {
            return Err(anyhow!(
                "{} purchase on {} is too large to add to the position",
                tx.asset,
                tx.date
            ));
        };

        self.total_quantity = quantity;
        self.total_cost = cost;
        Ok(())
    }

    /// Match a sale against the average cost up to that point and return the
    /// lot cost basis. The position shrinks by the sold quantity.
    pub fn match_sale(&mut self, tx: &Transaction) -> Result<Decimal> {
        if tx.transaction_type != TransactionType::Sell {
            return Err(anyhow!("Transaction is not a sale"));
        }

        if tx.amount > self.total_quantity {
            return Err(anyhow!(
                "Insufficient purchase history for {} sale on {}. Selling {} units but only {} available",
                tx.asset,
                tx.date,
                tx.amount,
                self.total_quantity
            ));
        }

        let cost_basis = self
            .average_cost()
            .and_then(|avg| avg.checked_mul(tx.amount))
            .ok_or_else(|| {
                anyhow!(
                    "Average cost of {} sale on {} is too large to compute",
                    tx.asset,
                    tx.date
                )
            })?;
        self.reduce(tx.amount, cost_basis);

        Ok(cost_basis)
    }

    /// Remove a sold quantity whose cost basis is already known.
    ///
    /// Oversells clear the position instead of going negative.
    pub fn apply_known_sale(&mut self, quantity: Decimal) {
        let quantity = quantity.min(self.total_quantity);
        // Without a usable average the whole position cost goes with the sale
        let cost = self
            .average_cost()
            .and_then(|avg| avg.checked_mul(quantity))
            .unwrap_or(self.total_cost);
        self.reduce(quantity, cost);
    }

    fn reduce(&mut self, quantity: Decimal, cost: Decimal) {
        self.total_quantity -= quantity;
        self.total_cost = (self.total_cost - cost).max(Decimal::ZERO);
        if self.total_quantity <= Decimal::ZERO {
            self.total_quantity = Decimal::ZERO;
            self.total_cost = Decimal::ZERO;
        }
    }

    pub fn remaining_quantity(&self) -> Decimal {
        self.total_quantity
    }

    /// Average unit cost of the position; `None` if it does not fit a `Decimal`
    pub fn average_cost(&self) -> Option<Decimal> {
        if self.total_quantity > Decimal::ZERO {
            self.total_cost.checked_div(self.total_quantity)
        } else {
            Some(Decimal::ZERO)
        }
    }
}

impl Default for AverageCostMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Fill in the lot cost basis of sells that have none, using the running
/// average cost of earlier buys of the same asset.
///
/// Returns the transactions in date order (stable). Sells that already carry a
/// cost basis keep it; sells larger than the held position stay without one,
/// which makes the batch calculator leave them out.
pub fn assign_average_cost_basis(transactions: &[Transaction]) -> Vec<Transaction> {
    let mut ordered = transactions.to_vec();
    ordered.sort_by_key(|tx| tx.date);

    let mut positions: HashMap<String, AverageCostMatcher> = HashMap::new();

    for tx in &mut ordered {
        let matcher = positions.entry(tx.asset.clone()).or_default();

        match tx.transaction_type {
            TransactionType::Buy => {
                if let Err(e) = matcher.add_purchase(tx) {
                    warn!("{}; purchase left out of the average cost", e);
                }
            }
            TransactionType::Sell => {
                if tx.cost_basis.is_some() {
                    matcher.apply_known_sale(tx.amount);
                    continue;
                }
                match matcher.match_sale(tx) {
                    Ok(cost_basis) => {
                        debug!(
                            "Assigned cost basis {} to {} sell on {}",
                            cost_basis, tx.asset, tx.date
                        );
                        tx.cost_basis = Some(cost_basis);
                    }
                    Err(e) => {
                        warn!("{}; sale left without cost basis", e);
                    }
                }
            }
        }
    }

    ordered
}
