//! Portfolio valuation helpers
//!
//! Derives current allocation weights from custody holdings and a price
//! map. Prices are supplied by the caller; the rebalancer consumes no
//! market-data feed of its own.

use atlas_core::CustodyHolding;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Total portfolio value of a set of holdings at the given prices
///
/// Assets without a price contribute nothing.
pub fn portfolio_value(holdings: &[CustodyHolding], prices: &HashMap<String, Decimal>) -> Decimal {
    holdings
        .iter()
        .map(|h| h.quantity * prices.get(&h.asset).copied().unwrap_or(Decimal::ZERO))
        .sum()
}

/// Current allocation weight per asset, normalized to sum to 1
///
/// Returns an empty map for a portfolio with no value.
pub fn current_allocations(
    holdings: &[CustodyHolding],
    prices: &HashMap<String, Decimal>,
) -> BTreeMap<String, Decimal> {
    let total = portfolio_value(holdings, prices);
    if total <= Decimal::ZERO {
        return BTreeMap::new();
    }

    let mut allocations = BTreeMap::new();
    for holding in holdings {
        let price = prices.get(&holding.asset).copied().unwrap_or(Decimal::ZERO);
        let value = holding.quantity * price;
        if value > Decimal::ZERO {
            *allocations.entry(holding.asset.clone()).or_insert(Decimal::ZERO) += value / total;
        }
    }
    allocations
}

/// Largest single allocation weight (concentration risk indicator)
pub fn concentration(allocations: &BTreeMap<String, Decimal>) -> Decimal {
    allocations
        .values()
        .copied()
        .max()
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::{CustodyType, SegregationType};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn holding(asset: &str, quantity: Decimal) -> CustodyHolding {
        CustodyHolding::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            asset,
            quantity,
            CustodyType::SelfCustody,
            SegregationType::Segregated,
            Utc::now(),
        )
    }

    #[test]
    fn test_portfolio_value_and_allocations() {
        let holdings = vec![holding("BTC", dec!(2)), holding("ETH", dec!(50))];
        let prices = HashMap::from([
            ("BTC".to_string(), dec!(50_000)),
            ("ETH".to_string(), dec!(2_000)),
        ]);

        assert_eq!(portfolio_value(&holdings, &prices), dec!(200_000));

        let allocations = current_allocations(&holdings, &prices);
        assert_eq!(allocations["BTC"], dec!(0.5));
        assert_eq!(allocations["ETH"], dec!(0.5));
    }

    #[test]
    fn test_empty_portfolio() {
        let allocations = current_allocations(&[], &HashMap::new());
        assert!(allocations.is_empty());
        assert_eq!(concentration(&allocations), Decimal::ZERO);
    }

    #[test]
    fn test_unpriced_assets_are_ignored() {
        let holdings = vec![holding("BTC", dec!(1)), holding("MYSTERY", dec!(1_000_000))];
        let prices = HashMap::from([("BTC".to_string(), dec!(50_000))]);

        let allocations = current_allocations(&holdings, &prices);
        assert_eq!(allocations["BTC"], Decimal::ONE);
        assert!(!allocations.contains_key("MYSTERY"));
    }

    #[test]
    fn test_concentration() {
        let allocations = BTreeMap::from([
            ("BTC".to_string(), dec!(0.7)),
            ("ETH".to_string(), dec!(0.3)),
        ]);
        assert_eq!(concentration(&allocations), dec!(0.7));
    }
}
