//! Execution scheduler errors

use atlas_core::OrderType;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Order type {0:?} is not algorithmic")]
    NotAlgorithmic(OrderType),

    #[error("Unrecognized algo parameter '{key}' for {order_type:?}")]
    UnrecognizedParameter { key: String, order_type: OrderType },

    #[error("Invalid algo parameter '{key}': {message}")]
    InvalidParameter { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
