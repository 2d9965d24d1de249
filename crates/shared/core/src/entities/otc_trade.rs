use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ClientId, Side};

/// Unique identifier for an OTC trade
pub type TradeId = Uuid;

/// OTC trade settlement style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeType {
    #[default]
    Spot,
    Forward,
    Swap,
}

/// Bilateral over-the-counter trade between a client and a counterparty
///
/// Immutable once recorded; its custody deltas are applied atomically to
/// both legs at settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtcTrade {
    pub id: TradeId,
    pub client_id: ClientId,
    pub counterparty_id: ClientId,
    pub symbol: String,
    /// Side from the client's perspective
    pub side: Side,
    pub quantity: Decimal,
    pub price: Decimal,
    pub settlement_date: DateTime<Utc>,
    pub trade_type: TradeType,
    pub is_block_trade: bool,
    pub minimum_quantity: Option<Decimal>,
    pub all_or_none: bool,
    pub trader_id: String,
    pub executed_at: DateTime<Utc>,
}

impl OtcTrade {
    /// Returns the notional value of the trade (price * quantity)
    pub fn notional(&self) -> Decimal {
        self.price * self.quantity
    }
}
