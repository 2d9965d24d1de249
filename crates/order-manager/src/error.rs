//! Order Lifecycle Manager errors

use atlas_core::{OrderId, OrderStatus};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown order: {0}")]
    UnknownOrder(OrderId),

    #[error(
        "Invalid fill for {order_id}: filled={filled} + fill={fill_quantity} exceeds quantity={quantity}"
    )]
    InvalidFill {
        order_id: OrderId,
        filled: Decimal,
        fill_quantity: Decimal,
        quantity: Decimal,
    },

    #[error("Fill quantity must be positive, got {0}")]
    NonPositiveFill(Decimal),

    #[error("Invalid transition for {order_id}: order is already {status:?}")]
    InvalidTransition {
        order_id: OrderId,
        status: OrderStatus,
    },

    #[error("Order {0} is not a root order; children cannot be decomposed")]
    NotARootOrder(OrderId),
}

pub type Result<T> = std::result::Result<T, Error>;
