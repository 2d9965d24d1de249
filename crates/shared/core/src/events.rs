//! Engine events published to the event bus
//!
//! Events are best-effort notifications for downstream consumers
//! (reporting, client notification, analytics). The core never depends on
//! their delivery or ordering.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{ClientId, HoldingId, OrderId, Side, TradeId};

/// Events emitted by the execution and custody engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum EngineEvent {
    /// An order passed gating and was created
    OrderAdmitted {
        order_id: OrderId,
        client_id: ClientId,
        symbol: String,
        side: Side,
        quantity: Decimal,
        timestamp: DateTime<Utc>,
    },
    /// A fill was applied to an order
    OrderFilled {
        order_id: OrderId,
        fill_quantity: Decimal,
        fill_price: Decimal,
        cumulative_quantity: Decimal,
        fully_filled: bool,
        timestamp: DateTime<Utc>,
    },
    /// An order reached CANCELLED, either by request or by gating rejection
    OrderCancelled {
        order_id: OrderId,
        reason: Option<String>,
        timestamp: DateTime<Utc>,
    },
    /// A holding moved to a new custody arrangement
    CustodyMigrated {
        holding_id: HoldingId,
        client_id: ClientId,
        asset: String,
        from_type: String,
        to_type: String,
        timestamp: DateTime<Utc>,
    },
    /// A bilateral OTC trade settled against the custody ledger
    OtcSettled {
        trade_id: TradeId,
        client_id: ClientId,
        counterparty_id: ClientId,
        symbol: String,
        quantity: Decimal,
        price: Decimal,
        timestamp: DateTime<Utc>,
    },
    /// A rebalance pass emitted corrective orders
    RebalanceExecuted {
        client_id: ClientId,
        portfolio_id: Uuid,
        corrective_orders: Vec<OrderId>,
        timestamp: DateTime<Utc>,
    },
}

impl EngineEvent {
    /// Topic name for bus routing
    pub fn topic(&self) -> &'static str {
        match self {
            EngineEvent::OrderAdmitted { .. } => "order-admitted",
            EngineEvent::OrderFilled { .. } => "order-filled",
            EngineEvent::OrderCancelled { .. } => "order-cancelled",
            EngineEvent::CustodyMigrated { .. } => "custody-migrated",
            EngineEvent::OtcSettled { .. } => "otc-settled",
            EngineEvent::RebalanceExecuted { .. } => "rebalance-executed",
        }
    }
}
