use atlas_core::{Order, OrderId, OrderStatus, SliceId};
use atlas_ports::Clock;
use dashmap::DashMap;
use log::{debug, info};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Arena of orders with per-id serialized mutation
///
/// Entry guards are held only across synchronous mutation, never across
/// an await, so concurrent operations on distinct orders do not contend.
pub struct OrderLifecycleManager {
    orders: DashMap<OrderId, Order>,
    clock: Arc<dyn Clock>,
}

impl OrderLifecycleManager {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            orders: DashMap::new(),
            clock,
        }
    }

    /// Store an admitted order in state NEW
    ///
    /// Only called after the gating pipeline admits the request.
    pub fn create(&self, mut order: Order) -> OrderId {
        order.status = OrderStatus::New;
        order.filled_quantity = Decimal::ZERO;
        order.avg_fill_price = Decimal::ZERO;
        let order_id = order.id;
        info!(
            "Order created: id={}, symbol={}, side={}, type={:?}, qty={}",
            order_id, order.symbol, order.side, order.order_type, order.quantity
        );
        self.orders.insert(order_id, order);
        order_id
    }

    /// Store a gating-rejected request directly in CANCELLED state
    ///
    /// Keeps an audit record of the rejection; the order is terminal from
    /// birth and never becomes eligible for decomposition or fills.
    pub fn create_rejected(&self, mut order: Order, reason: &str) -> OrderId {
        order.status = OrderStatus::Cancelled;
        let order_id = order.id;
        info!("Order recorded as rejected: id={}, reason={}", order_id, reason);
        self.orders.insert(order_id, order);
        order_id
    }

    /// Look up an order by id
    pub fn order(&self, order_id: &OrderId) -> Result<Order> {
        self.orders
            .get(order_id)
            .map(|o| o.clone())
            .ok_or(Error::UnknownOrder(*order_id))
    }

    /// Record the child slice ids of a decomposed algorithmic order
    ///
    /// Decomposition is one level deep: only root orders may have children.
    pub fn register_children(&self, order_id: &OrderId, slice_ids: Vec<SliceId>) -> Result<()> {
        let mut entry = self
            .orders
            .get_mut(order_id)
            .ok_or(Error::UnknownOrder(*order_id))?;
        if !entry.is_root() {
            return Err(Error::NotARootOrder(*order_id));
        }
        debug!(
            "Order {} decomposed into {} child slices",
            order_id,
            slice_ids.len()
        );
        entry.child_slice_ids = slice_ids;
        entry.updated_at = self.clock.now();
        Ok(())
    }

    /// Apply a fill to an order
    ///
    /// Maintains the quantity-weighted average fill price and transitions
    /// NEW/PARTIALLY_FILLED to PARTIALLY_FILLED or FILLED. A CANCELLED
    /// order still accepts fill bookkeeping without a state transition:
    /// a slice already dispatched at cancel time completes and reports
    /// its fill late. `filled_quantity <= quantity` holds throughout.
    pub fn apply_fill(
        &self,
        order_id: &OrderId,
        fill_quantity: Decimal,
        fill_price: Decimal,
    ) -> Result<OrderStatus> {
        if fill_quantity <= Decimal::ZERO {
            return Err(Error::NonPositiveFill(fill_quantity));
        }

        let mut entry = self
            .orders
            .get_mut(order_id)
            .ok_or(Error::UnknownOrder(*order_id))?;

        if entry.status == OrderStatus::Filled {
            return Err(Error::InvalidTransition {
                order_id: *order_id,
                status: entry.status,
            });
        }

        let new_filled = entry.filled_quantity + fill_quantity;
        if new_filled > entry.quantity {
            return Err(Error::InvalidFill {
                order_id: *order_id,
                filled: entry.filled_quantity,
                fill_quantity,
                quantity: entry.quantity,
            });
        }

        // Incremental weighted average over all fills
        entry.avg_fill_price = (entry.avg_fill_price * entry.filled_quantity
            + fill_price * fill_quantity)
            / new_filled;
        entry.filled_quantity = new_filled;
        entry.updated_at = self.clock.now();

        if entry.status != OrderStatus::Cancelled {
            entry.status = if new_filled == entry.quantity {
                OrderStatus::Filled
            } else {
                OrderStatus::PartiallyFilled
            };
        }

        debug!(
            "Fill applied: order={}, qty={}, price={}, cumulative={}, status={:?}",
            order_id, fill_quantity, fill_price, new_filled, entry.status
        );
        Ok(entry.status)
    }

    /// Cancel an order
    ///
    /// Fails with `InvalidTransition` if the order is already terminal.
    /// Returns a snapshot of the cancelled order so the caller can purge
    /// its pending slices from the dispatch queue before reporting
    /// success. The CANCELLED mark itself is immediately observable.
    pub fn cancel(&self, order_id: &OrderId) -> Result<Order> {
        let mut entry = self
            .orders
            .get_mut(order_id)
            .ok_or(Error::UnknownOrder(*order_id))?;

        if entry.status.is_terminal() {
            return Err(Error::InvalidTransition {
                order_id: *order_id,
                status: entry.status,
            });
        }

        entry.status = OrderStatus::Cancelled;
        entry.updated_at = self.clock.now();
        info!("Order cancelled: id={}", order_id);
        Ok(entry.clone())
    }

    /// Number of orders in the arena (audit records included)
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::{OrderType, Side, TimeInForce};
    use atlas_ports::SystemClock;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn manager() -> OrderLifecycleManager {
        OrderLifecycleManager::new(Arc::new(SystemClock))
    }

    fn new_order(quantity: Decimal) -> Order {
        Order::new_with_time(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "ETH-USD",
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
    fn test_fill_transitions() {
        let mgr = manager();
        let id = mgr.create(new_order(dec!(10)));

        let status = mgr.apply_fill(&id, dec!(4), dec!(2000)).unwrap();
        assert_eq!(status, OrderStatus::PartiallyFilled);

        let status = mgr.apply_fill(&id, dec!(6), dec!(2100)).unwrap();
        assert_eq!(status, OrderStatus::Filled);

        let order = mgr.order(&id).unwrap();
        assert_eq!(order.filled_quantity, dec!(10));
    }

    #[test]
    fn test_weighted_average_fill_price() {
        let mgr = manager();
        let id = mgr.create(new_order(dec!(10)));

        mgr.apply_fill(&id, dec!(4), dec!(2000)).unwrap();
        mgr.apply_fill(&id, dec!(6), dec!(2100)).unwrap();

        // (4*2000 + 6*2100) / 10 = 2060
        assert_eq!(mgr.order(&id).unwrap().avg_fill_price, dec!(2060));
    }

    #[test]
    fn test_overfill_rejected_without_mutation() {
        let mgr = manager();
        let id = mgr.create(new_order(dec!(10)));

        mgr.apply_fill(&id, dec!(8), dec!(2000)).unwrap();
        let err = mgr.apply_fill(&id, dec!(3), dec!(2000)).unwrap_err();
        assert!(matches!(err, Error::InvalidFill { .. }));

        // No partial mutation on the failed fill
        let order = mgr.order(&id).unwrap();
        assert_eq!(order.filled_quantity, dec!(8));
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
    }

    #[test]
    fn test_cancel_terminal_is_invalid() {
        let mgr = manager();
        let id = mgr.create(new_order(dec!(5)));

        mgr.cancel(&id).unwrap();
        assert!(matches!(
            mgr.cancel(&id),
            Err(Error::InvalidTransition { .. })
        ));

        let filled = mgr.create(new_order(dec!(5)));
        mgr.apply_fill(&filled, dec!(5), dec!(100)).unwrap();
        assert!(matches!(
            mgr.cancel(&filled),
            Err(Error::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_late_fill_after_cancel_keeps_cancelled_status() {
        let mgr = manager();
        let id = mgr.create(new_order(dec!(10)));

        mgr.cancel(&id).unwrap();

        // A slice dispatched before the cancel still completes
        let status = mgr.apply_fill(&id, dec!(3), dec!(1500)).unwrap();
        assert_eq!(status, OrderStatus::Cancelled);

        let order = mgr.order(&id).unwrap();
        assert_eq!(order.filled_quantity, dec!(3));
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_rejected_audit_record() {
        let mgr = manager();
        let id = mgr.create_rejected(new_order(dec!(10)), "Rejected by compliance");

        let order = mgr.order(&id).unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert!(order.child_slice_ids.is_empty());
    }

    #[test]
    fn test_children_only_on_root_orders() {
        let mgr = manager();
        let mut child = new_order(dec!(10));
        child.parent_order_id = Some(Uuid::new_v4());
        let id = mgr.create(child);

        assert!(matches!(
            mgr.register_children(&id, vec![Uuid::new_v4()]),
            Err(Error::NotARootOrder(_))
        ));
    }
}
