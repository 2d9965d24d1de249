use async_trait::async_trait;
use atlas_core::Order;
use atlas_ports::{Compliance, PortResult, Risk};

/// Predicate that admits everything
///
/// Default wiring for environments where the real compliance and risk
/// services are not connected (simulation, integration tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitAll;

#[async_trait]
impl Compliance for PermitAll {
    async fn evaluate(&self, _order: &Order) -> PortResult<bool> {
        Ok(true)
    }
}

#[async_trait]
impl Risk for PermitAll {
    async fn evaluate(&self, _order: &Order) -> PortResult<bool> {
        Ok(true)
    }
}
