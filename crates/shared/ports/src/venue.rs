use async_trait::async_trait;
use atlas_core::{OrderId, Side, SliceId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PortResult;

/// A standalone execution request submitted to a venue
///
/// Child slices and directly-routed orders share this shape; a slice
/// carries its slice id for attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub order_id: OrderId,
    pub slice_id: Option<SliceId>,
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    pub limit_price: Option<Decimal>,
}

/// Fill reported back by the venue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueFill {
    pub quantity: Decimal,
    pub price: Decimal,
    pub timestamp: Timestamp,
}

/// Port for order execution venues
#[async_trait]
pub trait ExecutionVenue: Send + Sync {
    /// Submit an execution request; resolves when the venue reports a fill
    async fn submit(&self, request: ExecutionRequest) -> PortResult<VenueFill>;
}
