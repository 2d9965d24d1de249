use async_trait::async_trait;
use atlas_ports::{ExecutionRequest, ExecutionVenue, PortResult, VenueFill};
use dashmap::DashMap;
use log::debug;
use rust_decimal::Decimal;

/// In-process execution venue
///
/// Fills every request in full at the request's limit price, or at a
/// configured reference price for market orders. Default wiring for
/// simulation and integration tests; production deployments adapt a real
/// venue behind the same port.
#[derive(Debug, Default)]
pub struct SimulatedVenue {
    reference_prices: DashMap<String, Decimal>,
}

impl SimulatedVenue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reference price used to fill market orders in a symbol
    pub fn set_reference_price(&self, symbol: &str, price: Decimal) {
        self.reference_prices.insert(symbol.to_string(), price);
    }

    fn fill_price(&self, request: &ExecutionRequest) -> Decimal {
        request.limit_price.unwrap_or_else(|| {
            self.reference_prices
                .get(&request.symbol)
                .map(|p| *p)
                .unwrap_or(Decimal::ONE)
        })
    }
}

#[async_trait]
impl ExecutionVenue for SimulatedVenue {
    async fn submit(&self, request: ExecutionRequest) -> PortResult<VenueFill> {
        let price = self.fill_price(&request);
        debug!(
            "Venue fill: order={}, slice={:?}, {} {} @ {}",
            request.order_id, request.slice_id, request.side, request.quantity, price
        );
        Ok(VenueFill {
            quantity: request.quantity,
            price,
            timestamp: chrono::Utc::now(),
        })
    }
}
