use async_trait::async_trait;
use atlas_core::Order;

use crate::error::PortResult;

/// Port for the compliance rule engine
///
/// A pluggable boolean predicate over an order. Implementations may call
/// out to slow external services; the gating pipeline bounds them with a
/// timeout and fails closed on error.
#[async_trait]
pub trait Compliance: Send + Sync {
    /// Evaluate an order against compliance rules
    async fn evaluate(&self, order: &Order) -> PortResult<bool>;
}

/// Port for the pre-trade risk engine
///
/// Independent of compliance: neither predicate observes the other's
/// side effects, so the two can be evaluated concurrently.
#[async_trait]
pub trait Risk: Send + Sync {
    /// Evaluate an order against risk limits
    async fn evaluate(&self, order: &Order) -> PortResult<bool>;
}
