use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, ClientId, OrderStatus, OrderType, Side, SliceId, TimeInForce};

/// Unique identifier for an order
pub type OrderId = Uuid;

/// Full institutional order details
///
/// Orders form at most a one-level parent/child hierarchy: algorithmic
/// root orders reference their child slices by id, and children never
/// have children of their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub client_id: ClientId,
    pub account_id: AccountId,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub filled_quantity: Decimal,
    /// Quantity-weighted average price across all fills
    pub avg_fill_price: Decimal,
    /// Required for Limit and StopLimit orders
    pub price: Option<Decimal>,
    /// Required for StopLoss and StopLimit orders
    pub stop_price: Option<Decimal>,
    pub time_in_force: TimeInForce,
    pub status: OrderStatus,
    /// None for root orders; set for audit records of child executions
    pub parent_order_id: Option<OrderId>,
    /// Ordered child slice ids, populated when an algorithmic order is decomposed
    pub child_slice_ids: Vec<SliceId>,
    pub trader_id: String,
    pub desk: String,
    pub strategy: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order with explicit timestamp
    #[allow(clippy::too_many_arguments)]
    pub fn new_with_time(
        client_id: ClientId,
        account_id: AccountId,
        symbol: impl Into<String>,
        side: Side,
        order_type: OrderType,
        quantity: Decimal,
        price: Option<Decimal>,
        stop_price: Option<Decimal>,
        time_in_force: TimeInForce,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            account_id,
            symbol: symbol.into(),
            side,
            order_type,
            quantity,
            filled_quantity: Decimal::ZERO,
            avg_fill_price: Decimal::ZERO,
            price,
            stop_price,
            time_in_force,
            status: OrderStatus::New,
            parent_order_id: None,
            child_slice_ids: Vec::new(),
            trader_id: String::new(),
            desk: String::new(),
            strategy: String::new(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Attach trading-desk attribution fields
    pub fn with_attribution(
        mut self,
        trader_id: impl Into<String>,
        desk: impl Into<String>,
        strategy: impl Into<String>,
    ) -> Self {
        self.trader_id = trader_id.into();
        self.desk = desk.into();
        self.strategy = strategy.into();
        self
    }

    /// Validate the order based on order type requirements
    pub fn validate(&self) -> bool {
        if self.quantity <= Decimal::ZERO {
            return false;
        }
        let price_ok = !self.order_type.requires_price() || self.price.is_some();
        let stop_ok = !self.order_type.requires_stop_price() || self.stop_price.is_some();
        price_ok && stop_ok
    }

    /// Returns true if this is a root order (not a decomposition child)
    pub fn is_root(&self) -> bool {
        self.parent_order_id.is_none()
    }

    /// Returns remaining quantity to be filled
    pub fn remaining_quantity(&self) -> Decimal {
        self.quantity - self.filled_quantity
    }

    /// Returns true if the order is completely filled
    pub fn is_filled(&self) -> bool {
        self.filled_quantity >= self.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn market_order(quantity: Decimal) -> Order {
        Order::new_with_time(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "BTC-USD",
            Side::Buy,
            OrderType::Market,
            quantity,
            None,
            None,
            TimeInForce::GTC,
            Utc::now(),
        )
    }

    #[test]
    fn test_new_order_starts_unfilled() {
        let order = market_order(dec!(10));
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.filled_quantity, Decimal::ZERO);
        assert_eq!(order.remaining_quantity(), dec!(10));
        assert!(order.is_root());
    }

    #[test]
    fn test_validation_rejects_zero_quantity() {
        let order = market_order(Decimal::ZERO);
        assert!(!order.validate());
    }

    #[test]
    fn test_limit_requires_price() {
        let mut order = market_order(dec!(1));
        order.order_type = OrderType::Limit;
        assert!(!order.validate());

        order.price = Some(dec!(50_000));
        assert!(order.validate());
    }
}
