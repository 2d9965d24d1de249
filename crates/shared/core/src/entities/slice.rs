use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::OrderId;

/// Unique identifier for a child slice
pub type SliceId = Uuid;

/// Child slice lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SliceState {
    /// Waiting in the dispatch queue
    Pending,
    /// Sent to the venue; always completes, never retried or reversed
    Dispatched,
    /// Removed from the queue by parent cancellation
    Skipped,
}

/// A single timed slice of a decomposed algorithmic order
///
/// Owned by its parent order; the quantities of all slices of a parent
/// sum exactly to the parent quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildSlice {
    pub id: SliceId,
    pub parent_order_id: OrderId,
    /// Position in the schedule, 0-based
    pub sequence: usize,
    pub quantity: Decimal,
    pub scheduled_dispatch_time: DateTime<Utc>,
    pub state: SliceState,
}

impl ChildSlice {
    pub fn new(
        parent_order_id: OrderId,
        sequence: usize,
        quantity: Decimal,
        scheduled_dispatch_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_order_id,
            sequence,
            quantity,
            scheduled_dispatch_time,
            state: SliceState::Pending,
        }
    }
}
