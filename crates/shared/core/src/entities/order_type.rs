use serde::{Deserialize, Serialize};

/// Order types accepted from institutional clients
///
/// Algorithmic types are decomposed into timed child slices by the
/// execution scheduler; the rest route directly to a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Execute at current market price
    Market,
    /// Execute at specified price or better
    Limit,
    /// Market order triggered when price reaches stop price
    StopLoss,
    /// Limit order triggered when price reaches stop price
    StopLimit,
    /// Time-weighted average price: equal slices spaced evenly over a window
    Twap,
    /// Volume-weighted average price: slices follow an intraday volume curve
    Vwap,
    /// Implementation shortfall: front-loaded slices trading impact against timing risk
    ImplementationShortfall,
}

impl OrderType {
    /// Returns true if this order type is decomposed into child slices
    pub fn is_algorithmic(&self) -> bool {
        matches!(
            self,
            OrderType::Twap | OrderType::Vwap | OrderType::ImplementationShortfall
        )
    }

    /// Returns true if a limit price is required
    pub fn requires_price(&self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLimit)
    }

    /// Returns true if a stop price is required
    pub fn requires_stop_price(&self) -> bool {
        matches!(self, OrderType::StopLoss | OrderType::StopLimit)
    }
}
