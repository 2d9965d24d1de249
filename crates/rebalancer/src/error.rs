//! Portfolio Rebalancer errors

use atlas_core::ClientId;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown portfolio {portfolio_id} for client {client_id}")]
    UnknownPortfolio {
        client_id: ClientId,
        portfolio_id: Uuid,
    },

    #[error("Invalid target allocations: {0}")]
    InvalidTargets(String),
}

pub type Result<T> = std::result::Result<T, Error>;
