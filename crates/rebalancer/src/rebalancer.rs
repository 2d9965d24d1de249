use atlas_core::{AllocationDelta, ClientId, CustodyHolding, PortfolioAllocation, Side};
use atlas_ports::Clock;
use dashmap::DashMap;
use log::info;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::valuation;

/// Default drift threshold below which no corrective order is emitted
pub const DEFAULT_REBALANCE_THRESHOLD: Decimal = dec!(0.01);

/// Tolerance for target weights summing to one
const TARGET_SUM_TOLERANCE: Decimal = dec!(0.000001);

/// Default portfolio targets seeded at client onboarding
const DEFAULT_TARGETS: [(&str, Decimal); 4] = [
    ("BTC", dec!(0.4)),
    ("ETH", dec!(0.3)),
    ("ALTCOINS", dec!(0.2)),
    ("STABLECOINS", dec!(0.1)),
];

/// A corrective trade produced by a rebalance pass
///
/// `quantity` is notional: |deviation| x portfolio value. The engine
/// turns these into ordinary order requests that pass through gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectiveOrder {
    pub asset_class: String,
    pub side: Side,
    pub quantity: Decimal,
    pub deviation: Decimal,
}

/// Drift-based portfolio rebalancer
///
/// Holds target and observed allocations per (client, portfolio). For a
/// given portfolio the target weights always sum to 1 within tolerance
/// after any update.
pub struct PortfolioRebalancer {
    allocations: DashMap<(ClientId, Uuid), Vec<PortfolioAllocation>>,
    threshold: Decimal,
    clock: Arc<dyn Clock>,
}

impl PortfolioRebalancer {
    pub fn new(threshold: Decimal, clock: Arc<dyn Clock>) -> Self {
        Self {
            allocations: DashMap::new(),
            threshold,
            clock,
        }
    }

    /// Create a portfolio with the standard onboarding targets
    pub fn seed_default_portfolio(&self, client_id: ClientId) -> Uuid {
        let portfolio_id = Uuid::new_v4();
        let targets: BTreeMap<String, Decimal> = DEFAULT_TARGETS
            .iter()
            .map(|(asset, weight)| (asset.to_string(), *weight))
            .collect();
        self.set_targets(client_id, portfolio_id, &targets)
            .expect("default targets sum to one");
        portfolio_id
    }

    /// Replace the target weights of a portfolio
    ///
    /// Rejects sets whose weights are out of [0, 1] or do not sum to 1
    /// within tolerance. Observed allocations for retained asset classes
    /// survive the update.
    pub fn set_targets(
        &self,
        client_id: ClientId,
        portfolio_id: Uuid,
        targets: &BTreeMap<String, Decimal>,
    ) -> Result<()> {
        if targets.is_empty() {
            return Err(Error::InvalidTargets("target set is empty".to_string()));
        }
        for (asset_class, weight) in targets {
            if *weight < Decimal::ZERO || *weight > Decimal::ONE {
                return Err(Error::InvalidTargets(format!(
                    "{} weight {} out of [0, 1]",
                    asset_class, weight
                )));
            }
        }
        let total: Decimal = targets.values().sum();
        if (total - Decimal::ONE).abs() > TARGET_SUM_TOLERANCE {
            return Err(Error::InvalidTargets(format!(
                "weights sum to {}, expected 1",
                total
            )));
        }

        let key = (client_id, portfolio_id);
        let now = self.clock.now();
        let previous: HashMap<String, Decimal> = self
            .allocations
            .get(&key)
            .map(|entry| {
                entry
                    .iter()
                    .map(|a| (a.asset_class.clone(), a.current_allocation))
                    .collect()
            })
            .unwrap_or_default();

        let mut records: Vec<PortfolioAllocation> = targets
            .iter()
            .map(|(asset_class, weight)| {
                let mut allocation =
                    PortfolioAllocation::new(client_id, portfolio_id, asset_class, *weight, now);
                if let Some(current) = previous.get(asset_class) {
                    allocation.current_allocation = *current;
                }
                allocation
            })
            .collect();

        // Classes held but dropped from the target set stay visible with
        // a zero target, so drift computation sells them out
        for (asset_class, current) in &previous {
            if *current > Decimal::ZERO && !targets.contains_key(asset_class) {
                let mut allocation = PortfolioAllocation::new(
                    client_id,
                    portfolio_id,
                    asset_class,
                    Decimal::ZERO,
                    now,
                );
                allocation.current_allocation = *current;
                records.push(allocation);
            }
        }

        self.allocations.insert(key, records);
        Ok(())
    }

    /// Record observed allocation weights for a portfolio
    ///
    /// Asset classes observed but absent from the target set are carried
    /// with a zero target so drift computation sees them as overweight.
    pub fn set_current_allocations(
        &self,
        client_id: ClientId,
        portfolio_id: Uuid,
        currents: &BTreeMap<String, Decimal>,
    ) -> Result<()> {
        let key = (client_id, portfolio_id);
        let mut entry = self.allocations.get_mut(&key).ok_or(Error::UnknownPortfolio {
            client_id,
            portfolio_id,
        })?;

        for allocation in entry.iter_mut() {
            allocation.current_allocation = currents
                .get(&allocation.asset_class)
                .copied()
                .unwrap_or(Decimal::ZERO);
        }
        let known: Vec<String> = entry.iter().map(|a| a.asset_class.clone()).collect();
        let now = self.clock.now();
        for (asset_class, current) in currents {
            if !known.contains(asset_class) {
                let mut allocation = PortfolioAllocation::new(
                    client_id,
                    portfolio_id,
                    asset_class,
                    Decimal::ZERO,
                    now,
                );
                allocation.current_allocation = *current;
                entry.push(allocation);
            }
        }
        Ok(())
    }

    /// Derive and record observed allocations from custody holdings
    pub fn observe_holdings(
        &self,
        client_id: ClientId,
        portfolio_id: Uuid,
        holdings: &[CustodyHolding],
        prices: &HashMap<String, Decimal>,
    ) -> Result<Decimal> {
        let currents = valuation::current_allocations(holdings, prices);
        self.set_current_allocations(client_id, portfolio_id, &currents)?;
        Ok(valuation::portfolio_value(holdings, prices))
    }

    /// Deviations exceeding the rebalance threshold
    pub fn compute_drift(
        &self,
        client_id: &ClientId,
        portfolio_id: &Uuid,
    ) -> Result<Vec<AllocationDelta>> {
        let entry = self
            .allocations
            .get(&(*client_id, *portfolio_id))
            .ok_or(Error::UnknownPortfolio {
                client_id: *client_id,
                portfolio_id: *portfolio_id,
            })?;

        Ok(entry
            .iter()
            .filter(|a| a.deviation().abs() > self.threshold)
            .map(|a| AllocationDelta::new(a.asset_class.clone(), a.deviation()))
            .collect())
    }

    /// Plan corrective orders against a new target set
    ///
    /// Applies the supplied targets, recomputes deltas against the
    /// observed allocations, and emits one corrective order per asset
    /// class whose absolute delta exceeds the threshold: BUY when
    /// underweight, SELL when overweight, sized as delta x portfolio
    /// value. Records the rebalance time on the touched allocations.
    pub fn rebalance_plan(
        &self,
        client_id: ClientId,
        portfolio_id: Uuid,
        targets: &BTreeMap<String, Decimal>,
        portfolio_value: Decimal,
    ) -> Result<Vec<CorrectiveOrder>> {
        self.set_targets(client_id, portfolio_id, targets)?;

        let deltas = self.compute_drift(&client_id, &portfolio_id)?;
        let now = self.clock.now();
        let mut orders = Vec::with_capacity(deltas.len());

        for delta in deltas {
            orders.push(CorrectiveOrder {
                asset_class: delta.asset_class.clone(),
                side: delta.side,
                quantity: (delta.deviation.abs() * portfolio_value).normalize(),
                deviation: delta.deviation,
            });
        }

        if let Some(mut entry) = self.allocations.get_mut(&(client_id, portfolio_id)) {
            for allocation in entry.iter_mut() {
                allocation.last_rebalance = now;
            }
        }

        info!(
            "Rebalance planned for client {} portfolio {}: {} corrective orders",
            client_id,
            portfolio_id,
            orders.len()
        );
        Ok(orders)
    }

    /// Allocation records of a portfolio
    pub fn portfolio(
        &self,
        client_id: &ClientId,
        portfolio_id: &Uuid,
    ) -> Result<Vec<PortfolioAllocation>> {
        self.allocations
            .get(&(*client_id, *portfolio_id))
            .map(|entry| entry.clone())
            .ok_or(Error::UnknownPortfolio {
                client_id: *client_id,
                portfolio_id: *portfolio_id,
            })
    }
}
