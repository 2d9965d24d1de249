use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ClientId, Side};

/// Target vs. current portfolio weight for one asset class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioAllocation {
    pub id: Uuid,
    pub client_id: ClientId,
    pub portfolio_id: Uuid,
    pub asset_class: String,
    /// Desired fraction of the portfolio, in [0, 1]
    pub target_allocation: Decimal,
    /// Observed fraction of the portfolio, in [0, 1]
    pub current_allocation: Decimal,
    pub last_rebalance: DateTime<Utc>,
}

impl PortfolioAllocation {
    pub fn new(
        client_id: ClientId,
        portfolio_id: Uuid,
        asset_class: impl Into<String>,
        target_allocation: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            portfolio_id,
            asset_class: asset_class.into(),
            target_allocation,
            current_allocation: Decimal::ZERO,
            last_rebalance: timestamp,
        }
    }

    /// Signed deviation of current from target
    pub fn deviation(&self) -> Decimal {
        self.current_allocation - self.target_allocation
    }
}

/// One corrective action produced by drift computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationDelta {
    pub asset_class: String,
    /// current - target; negative means the portfolio is underweight
    pub deviation: Decimal,
    /// Buy when underweight, sell when overweight
    pub side: Side,
}

impl AllocationDelta {
    pub fn new(asset_class: impl Into<String>, deviation: Decimal) -> Self {
        let side = if deviation < Decimal::ZERO {
            Side::Buy
        } else {
            Side::Sell
        };
        Self {
            asset_class: asset_class.into(),
            deviation,
            side,
        }
    }
}
