use atlas_core::{ClientId, EngineEvent, OtcTrade, Side, TradeId, TradeType};
use atlas_custody::CustodyLedger;
use atlas_ports::{Clock, EventPublisher};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::info;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Inbound bilateral trade request
#[derive(Debug, Clone)]
pub struct OtcTradeCommand {
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
}

/// OTC settlement desk
///
/// Validates, records and settles bilateral trades. The asset leg moves
/// between the two parties' custody holdings as one atomic transfer; a
/// trade record is persisted only after settlement succeeds.
pub struct OtcSettlement {
    trades: DashMap<TradeId, OtcTrade>,
    custody: Arc<CustodyLedger>,
    events: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl OtcSettlement {
    pub fn new(
        custody: Arc<CustodyLedger>,
        events: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            trades: DashMap::new(),
            custody,
            events,
            clock,
        }
    }

    /// Execute a bilateral trade
    pub async fn execute(&self, command: OtcTradeCommand) -> Result<TradeId> {
        if command.quantity <= Decimal::ZERO {
            return Err(Error::Validation(format!(
                "quantity must be positive, got {}",
                command.quantity
            )));
        }
        if command.price <= Decimal::ZERO {
            return Err(Error::Validation(format!(
                "price must be positive, got {}",
                command.price
            )));
        }
        if command.client_id == command.counterparty_id {
            return Err(Error::Validation(
                "client and counterparty must differ".to_string(),
            ));
        }
        if let Some(min) = command.minimum_quantity {
            if command.quantity < min {
                return Err(Error::Validation(format!(
                    "quantity {} below minimum {}",
                    command.quantity, min
                )));
            }
        }

        // Asset flows from the selling party to the buying party; the
        // transfer applies both signed deltas atomically
        let (from, to) = match command.side {
            Side::Buy => (command.counterparty_id, command.client_id),
            Side::Sell => (command.client_id, command.counterparty_id),
        };
        self.custody
            .transfer(&from, &to, &command.symbol, command.quantity)?;

        let now = self.clock.now();
        let trade = OtcTrade {
            id: Uuid::new_v4(),
            client_id: command.client_id,
            counterparty_id: command.counterparty_id,
            symbol: command.symbol.clone(),
            side: command.side,
            quantity: command.quantity,
            price: command.price,
            settlement_date: command.settlement_date,
            trade_type: command.trade_type,
            is_block_trade: command.is_block_trade,
            minimum_quantity: command.minimum_quantity,
            all_or_none: command.all_or_none,
            trader_id: command.trader_id,
            executed_at: now,
        };
        let trade_id = trade.id;

        info!(
            "OTC trade settled: id={}, {} {} {} @ {} between {} and {}",
            trade_id,
            trade.side,
            trade.quantity,
            trade.symbol,
            trade.price,
            trade.client_id,
            trade.counterparty_id
        );
        self.trades.insert(trade_id, trade);

        self.events
            .publish(EngineEvent::OtcSettled {
                trade_id,
                client_id: command.client_id,
                counterparty_id: command.counterparty_id,
                symbol: command.symbol,
                quantity: command.quantity,
                price: command.price,
                timestamp: now,
            })
            .await;

        Ok(trade_id)
    }

    /// Look up an immutable settled trade record
    pub fn trade(&self, trade_id: &TradeId) -> Option<OtcTrade> {
        self.trades.get(trade_id).map(|t| t.clone())
    }

    /// Number of settled trades
    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use atlas_core::{CustodyType, SegregationType};
    use atlas_ports::SystemClock;
    use rust_decimal_macros::dec;

    struct NullEvents;

    #[async_trait]
    impl EventPublisher for NullEvents {
        async fn publish(&self, _event: EngineEvent) {}
    }

    fn desk() -> (Arc<CustodyLedger>, OtcSettlement) {
        let custody = Arc::new(CustodyLedger::new(Arc::new(SystemClock)));
        let settlement = OtcSettlement::new(
            Arc::clone(&custody),
            Arc::new(NullEvents),
            Arc::new(SystemClock),
        );
        (custody, settlement)
    }

    fn seed_holding(custody: &CustodyLedger, client: ClientId, asset: &str, qty: Decimal) {
        custody
            .setup_custody(
                client,
                Uuid::new_v4(),
                asset,
                qty,
                CustodyType::ColdStorage {
                    storage_location: "vault-a".to_string(),
                },
                SegregationType::Segregated,
                Decimal::ZERO,
            )
            .unwrap();
    }

    fn command(client: ClientId, counterparty: ClientId, side: Side) -> OtcTradeCommand {
        OtcTradeCommand {
            client_id: client,
            counterparty_id: counterparty,
            symbol: "BTC".to_string(),
            side,
            quantity: dec!(25),
            price: dec!(60_000),
            settlement_date: Utc::now() + chrono::Duration::days(2),
            trade_type: TradeType::Spot,
            is_block_trade: true,
            minimum_quantity: None,
            all_or_none: false,
            trader_id: "desk-otc-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_settles_both_legs() {
        let (custody, settlement) = desk();
        let client = Uuid::new_v4();
        let counterparty = Uuid::new_v4();
        seed_holding(&custody, counterparty, "BTC", dec!(100));

        let trade_id = settlement
            .execute(command(client, counterparty, Side::Buy))
            .await
            .unwrap();

        // Counterparty sold 25, client received 25
        assert_eq!(
            custody.client_holding(&counterparty, "BTC").unwrap().quantity,
            dec!(75)
        );
        assert_eq!(
            custody.client_holding(&client, "BTC").unwrap().quantity,
            dec!(25)
        );

        let trade = settlement.trade(&trade_id).unwrap();
        assert_eq!(trade.notional(), dec!(1_500_000));
    }

    #[tokio::test]
    async fn test_rejects_non_positive_quantity_and_price() {
        let (_, settlement) = desk();
        let mut cmd = command(Uuid::new_v4(), Uuid::new_v4(), Side::Buy);
        cmd.quantity = Decimal::ZERO;
        assert!(matches!(
            settlement.execute(cmd).await,
            Err(Error::Validation(_))
        ));

        let mut cmd = command(Uuid::new_v4(), Uuid::new_v4(), Side::Buy);
        cmd.price = dec!(-1);
        assert!(matches!(
            settlement.execute(cmd).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_leg_settles_nothing() {
        let (custody, settlement) = desk();
        let client = Uuid::new_v4();
        let counterparty = Uuid::new_v4();
        // Counterparty holds less than the trade quantity
        seed_holding(&custody, counterparty, "BTC", dec!(10));

        let result = settlement
            .execute(command(client, counterparty, Side::Buy))
            .await;
        assert!(matches!(
            result,
            Err(Error::Custody(atlas_custody::Error::InsufficientHolding { .. }))
        ));

        // Neither leg moved and no trade record was persisted
        assert_eq!(
            custody.client_holding(&counterparty, "BTC").unwrap().quantity,
            dec!(10)
        );
        assert_eq!(settlement.trade_count(), 0);
    }

    #[tokio::test]
    async fn test_sell_side_flows_from_client() {
        let (custody, settlement) = desk();
        let client = Uuid::new_v4();
        let counterparty = Uuid::new_v4();
        seed_holding(&custody, client, "BTC", dec!(40));

        settlement
            .execute(command(client, counterparty, Side::Sell))
            .await
            .unwrap();

        assert_eq!(
            custody.client_holding(&client, "BTC").unwrap().quantity,
            dec!(15)
        );
        assert_eq!(
            custody.client_holding(&counterparty, "BTC").unwrap().quantity,
            dec!(25)
        );
    }
}
