//! Custody Ledger errors

use atlas_core::{ClientId, HoldingId};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown holding: {0}")]
    UnknownHolding(HoldingId),

    #[error("No custody holding for client {client_id} in {asset}")]
    NoHoldingForAsset { client_id: ClientId, asset: String },

    #[error("Custody holding already exists for client {client_id} in {asset}")]
    HoldingExists { client_id: ClientId, asset: String },

    #[error("Insufficient holding {holding_id}: available={available}, requested={requested}")]
    InsufficientHolding {
        holding_id: HoldingId,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Concurrent migration already in flight for holding {0}")]
    ConcurrencyConflict(HoldingId),

    #[error("Invalid custody setup: {0}")]
    InvalidSetup(String),

    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
}

pub type Result<T> = std::result::Result<T, Error>;
