//! Atlas Portfolio Rebalancer
//!
//! Computes allocation drift against target weights and emits corrective
//! orders. Corrective orders re-enter the gating pipeline exactly as
//! client-submitted orders - the rebalancer has no privileged bypass.

mod error;
mod rebalancer;
mod valuation;

pub use error::{Error, Result};
pub use rebalancer::{CorrectiveOrder, PortfolioRebalancer, DEFAULT_REBALANCE_THRESHOLD};
pub use valuation::{concentration, current_allocations, portfolio_value};
