use atlas_core::{
    AccountId, AccountType, Client, ClientId, CustodyHolding, CustodyType, EngineEvent, HoldingId,
    Order, OrderId, OrderStatus, OrderType, PrimeBrokerageAccount, TimeInForce, TradeId,
};
use atlas_custody::CustodyLedger;
use atlas_execution::{AlgoParams, SliceDispatcher, strategy_for};
use atlas_gating::{Admission, GatingPipeline, RejectReason};
use atlas_order_manager::OrderLifecycleManager;
use atlas_ports::{
    Clock, Compliance, EventPublisher, ExecutionRequest, ExecutionVenue, Risk, SystemClock,
    VolumeCurve,
};
use atlas_rebalancer::PortfolioRebalancer;
use atlas_registry::AccountRegistry;
use atlas_settlement::{OtcSettlement, OtcTradeCommand};
use log::{info, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::bus::BroadcastEventBus;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::requests::{OnboardClient, PlaceOrder, Rebalance, SetupCustody};

/// The engine service context
///
/// Owns every component and wires request handlers through them. Created
/// once at process start; handlers take `&self` and are safe to call
/// concurrently.
pub struct InstitutionalEngine {
    config: EngineConfig,
    registry: Arc<AccountRegistry>,
    gating: GatingPipeline,
    lifecycle: Arc<OrderLifecycleManager>,
    dispatcher: SliceDispatcher,
    settlement: OtcSettlement,
    custody: Arc<CustodyLedger>,
    rebalancer: PortfolioRebalancer,
    venue: Arc<dyn ExecutionVenue>,
    volume_curve: Arc<dyn VolumeCurve>,
    events: Arc<BroadcastEventBus>,
    clock: Arc<dyn Clock>,
    _dispatch_loop: JoinHandle<()>,
}

impl InstitutionalEngine {
    /// Build and start the engine with the given collaborators
    pub fn new(
        config: EngineConfig,
        compliance: Arc<dyn Compliance>,
        risk: Arc<dyn Risk>,
        venue: Arc<dyn ExecutionVenue>,
        volume_curve: Arc<dyn VolumeCurve>,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let events = Arc::new(BroadcastEventBus::new(config.event_capacity));
        let registry = Arc::new(AccountRegistry::new());
        let lifecycle = Arc::new(OrderLifecycleManager::new(Arc::clone(&clock)));
        let custody = Arc::new(CustodyLedger::new(Arc::clone(&clock)));
        let gating = GatingPipeline::new(compliance, risk, config.gating_timeout());
        let dispatcher = SliceDispatcher::new(
            Arc::clone(&lifecycle),
            Arc::clone(&venue),
            events.clone() as Arc<dyn EventPublisher>,
            Arc::clone(&clock),
        );
        let settlement = OtcSettlement::new(
            Arc::clone(&custody),
            events.clone() as Arc<dyn EventPublisher>,
            Arc::clone(&clock),
        );
        let rebalancer =
            PortfolioRebalancer::new(config.rebalance_threshold, Arc::clone(&clock));

        let dispatch_loop = dispatcher.start();
        info!("{} started", config.name);

        Self {
            config,
            registry,
            gating,
            lifecycle,
            dispatcher,
            settlement,
            custody,
            rebalancer,
            venue,
            volume_curve,
            events,
            clock,
            _dispatch_loop: dispatch_loop,
        }
    }

    // ============ Onboarding ============

    /// Onboard a client: registry record, default prime account, default
    /// portfolio targets
    pub fn onboard_client(&self, request: OnboardClient) -> Result<(ClientId, AccountId, Uuid)> {
        if request.aum < Decimal::ZERO {
            return Err(EngineError::Validation(format!(
                "AUM must not be negative, got {}",
                request.aum
            )));
        }

        let now = self.clock.now();
        let client = Client::new(
            request.institution_name,
            request.institution_type,
            request.service_tier,
            request.aum,
            request.credit_limit,
            now,
        );
        let client_id = self.registry.register_client(client);

        let account = PrimeBrokerageAccount::new(
            client_id,
            AccountType::Prime,
            request.base_currency,
            now,
        )
        .with_permissions(vec!["SPOT".to_string(), "MARGIN".to_string()])
        .with_credit_limit(request.credit_limit);
        let account_id = self
            .registry
            .register_account(account)
            .map_err(|e| EngineError::Validation(e.to_string()))?;

        let portfolio_id = self.rebalancer.seed_default_portfolio(client_id);
        Ok((client_id, account_id, portfolio_id))
    }

    // ============ Orders ============

    /// Place an order: validate, gate, create, and route
    ///
    /// Algorithmic types are decomposed and handed to the dispatcher
    /// before returning; other types are routed to the venue and fill
    /// asynchronously.
    pub async fn place_order(&self, request: PlaceOrder) -> Result<OrderId> {
        // Validation failures are rejected before gating and never persisted
        if request.quantity <= Decimal::ZERO {
            return Err(EngineError::Validation(format!(
                "quantity must be positive, got {}",
                request.quantity
            )));
        }
        self.registry
            .verify_order_parties(&request.client_id, &request.account_id)
            .map_err(|e| EngineError::Validation(e.to_string()))?;
        let account = self
            .registry
            .account(&request.account_id)
            .map_err(|e| EngineError::Validation(e.to_string()))?;
        if !account.can_trade() {
            return Err(EngineError::Validation(format!(
                "account {} has no trading permission",
                account.id
            )));
        }

        let order = Order::new_with_time(
            request.client_id,
            request.account_id,
            request.symbol.clone(),
            request.side,
            request.order_type,
            request.quantity,
            request.price,
            request.stop_price,
            request.time_in_force.clone(),
            self.clock.now(),
        )
        .with_attribution(request.trader_id, request.desk, request.strategy);

        if !order.validate() {
            return Err(EngineError::Validation(format!(
                "order type {:?} is missing a required price",
                order.order_type
            )));
        }

        // Algo parameters are validated before gating so malformed
        // requests never consume a compliance/risk evaluation
        let algo_params = if order.order_type.is_algorithmic() {
            Some(
                AlgoParams::parse(order.order_type, &request.algo_parameters)
                    .map_err(|e| EngineError::Validation(e.to_string()))?,
            )
        } else if !request.algo_parameters.is_empty() {
            return Err(EngineError::Validation(format!(
                "algo parameters are not accepted for {:?} orders",
                order.order_type
            )));
        } else {
            None
        };

        match self.gating.admit(&order).await {
            Admission::Admitted => {}
            Admission::Rejected(reason) => return self.record_rejection(order, reason).await,
        }

        let order_id = self.lifecycle.create(order.clone());
        self.events
            .publish(EngineEvent::OrderAdmitted {
                order_id,
                client_id: order.client_id,
                symbol: order.symbol.clone(),
                side: order.side,
                quantity: order.quantity,
                timestamp: self.clock.now(),
            })
            .await;

        match algo_params {
            Some(params) => {
                let strategy = strategy_for(&params, &order.symbol, self.volume_curve.as_ref());
                let plans = strategy.decompose(order.quantity);
                let slice_ids = self.dispatcher.schedule(&order, &plans);
                self.lifecycle.register_children(&order_id, slice_ids)?;
            }
            None => self.route_to_venue(&order),
        }

        Ok(order_id)
    }

    /// Record a gating rejection
    ///
    /// Genuine rule rejections leave an audit order in CANCELLED state;
    /// indeterminate results (errors, timeouts) persist nothing.
    async fn record_rejection(&self, order: Order, reason: RejectReason) -> Result<OrderId> {
        match reason {
            RejectReason::Compliance | RejectReason::Risk => {
                let message = reason.to_string();
                let order_id = self.lifecycle.create_rejected(order, &message);
                self.events
                    .publish(EngineEvent::OrderCancelled {
                        order_id,
                        reason: Some(message.clone()),
                        timestamp: self.clock.now(),
                    })
                    .await;
                if reason == RejectReason::Compliance {
                    Err(EngineError::ComplianceRejected(message))
                } else {
                    Err(EngineError::RiskRejected(message))
                }
            }
            RejectReason::ComplianceUnavailable(msg) | RejectReason::RiskUnavailable(msg) => {
                Err(EngineError::ExternalServiceTimeout(msg))
            }
        }
    }

    /// Submit a non-algorithmic order to the venue
    ///
    /// The submission runs in its own task; the fill comes back through
    /// `apply_fill` semantics exactly like a slice fill would.
    fn route_to_venue(&self, order: &Order) {
        let request = ExecutionRequest {
            order_id: order.id,
            slice_id: None,
            symbol: order.symbol.clone(),
            side: order.side,
            quantity: order.quantity,
            limit_price: order.price,
        };
        let venue = Arc::clone(&self.venue);
        let lifecycle = Arc::clone(&self.lifecycle);
        let events = Arc::clone(&self.events);
        let clock = Arc::clone(&self.clock);
        let order_id = order.id;

        tokio::spawn(async move {
            match venue.submit(request).await {
                Ok(fill) => {
                    match lifecycle.apply_fill(&order_id, fill.quantity, fill.price) {
                        Ok(status) => {
                            let cumulative = lifecycle
                                .order(&order_id)
                                .map(|o| o.filled_quantity)
                                .unwrap_or(fill.quantity);
                            events
                                .publish(EngineEvent::OrderFilled {
                                    order_id,
                                    fill_quantity: fill.quantity,
                                    fill_price: fill.price,
                                    cumulative_quantity: cumulative,
                                    fully_filled: status == OrderStatus::Filled,
                                    timestamp: clock.now(),
                                })
                                .await;
                        }
                        Err(err) => warn!("Venue fill for {} not applied: {}", order_id, err),
                    }
                }
                Err(err) => warn!("Venue failed for order {}: {}", order_id, err),
            }
        });
    }

    /// Apply a fill reported by an external venue callback
    pub async fn apply_fill(
        &self,
        order_id: &OrderId,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<OrderStatus> {
        let status = self.lifecycle.apply_fill(order_id, quantity, price)?;
        let cumulative = self
            .lifecycle
            .order(order_id)
            .map(|o| o.filled_quantity)
            .unwrap_or(quantity);
        self.events
            .publish(EngineEvent::OrderFilled {
                order_id: *order_id,
                fill_quantity: quantity,
                fill_price: price,
                cumulative_quantity: cumulative,
                fully_filled: status == OrderStatus::Filled,
                timestamp: self.clock.now(),
            })
            .await;
        Ok(status)
    }

    /// Cancel an order
    ///
    /// Marks the order CANCELLED, then purges its PENDING slices from the
    /// dispatch queue; both complete before this returns. Slices already
    /// dispatched are unaffected and will complete.
    pub async fn cancel_order(&self, order_id: &OrderId) -> Result<()> {
        self.lifecycle.cancel(order_id)?;
        self.dispatcher.drop_pending(order_id);
        self.events
            .publish(EngineEvent::OrderCancelled {
                order_id: *order_id,
                reason: None,
                timestamp: self.clock.now(),
            })
            .await;
        Ok(())
    }

    /// Look up an order
    pub fn order(&self, order_id: &OrderId) -> Result<Order> {
        Ok(self.lifecycle.order(order_id)?)
    }

    // ============ OTC Settlement ============

    /// Execute a bilateral OTC trade
    pub async fn execute_otc(&self, command: OtcTradeCommand) -> Result<TradeId> {
        Ok(self.settlement.execute(command).await?)
    }

    // ============ Custody ============

    /// Set up custody for a (client, asset) pair
    pub fn setup_custody(&self, request: SetupCustody) -> Result<HoldingId> {
        self.registry
            .verify_order_parties(&request.client_id, &request.account_id)
            .map_err(|e| EngineError::Validation(e.to_string()))?;
        Ok(self.custody.setup_custody(
            request.client_id,
            request.account_id,
            &request.asset,
            request.quantity,
            request.custody_type,
            request.segregation_type,
            request.insurance_coverage,
        )?)
    }

    /// Migrate a holding to a new custody arrangement
    pub async fn migrate_custody(
        &self,
        holding_id: &HoldingId,
        new_type: CustodyType,
    ) -> Result<CustodyHolding> {
        let (old_type, holding) = self.custody.migrate(holding_id, new_type).await?;
        self.events
            .publish(EngineEvent::CustodyMigrated {
                holding_id: *holding_id,
                client_id: holding.client_id,
                asset: holding.asset.clone(),
                from_type: old_type.code().to_string(),
                to_type: holding.custody_type.code().to_string(),
                timestamp: self.clock.now(),
            })
            .await;
        Ok(holding)
    }

    // ============ Rebalancing ============

    /// Rebalance a portfolio to new targets
    ///
    /// Observes current allocations from the custody ledger at the given
    /// prices, plans corrective trades, and submits each one through the
    /// ordinary order path - gating included, no privileged bypass.
    /// Returns the ids of the admitted corrective orders.
    pub async fn rebalance(
        &self,
        request: Rebalance,
        prices: &HashMap<String, Decimal>,
    ) -> Result<Vec<OrderId>> {
        let client = self
            .registry
            .client(&request.client_id)
            .map_err(|e| EngineError::Validation(e.to_string()))?;
        let account = self
            .registry
            .client_accounts(&client.id)
            .into_iter()
            .find(|a| a.can_trade())
            .ok_or_else(|| {
                EngineError::Validation(format!(
                    "client {} has no tradeable account",
                    client.id
                ))
            })?;

        let holdings = self.custody.holdings_for_client(&client.id);
        let portfolio_value = self.rebalancer.observe_holdings(
            client.id,
            request.portfolio_id,
            &holdings,
            prices,
        )?;

        let plan = self.rebalancer.rebalance_plan(
            client.id,
            request.portfolio_id,
            &request.target_allocations,
            portfolio_value,
        )?;

        let mut order_ids = Vec::with_capacity(plan.len());
        for corrective in plan {
            let price = prices
                .get(&corrective.asset_class)
                .copied()
                .unwrap_or(Decimal::ONE);
            let order_request = PlaceOrder {
                client_id: client.id,
                account_id: account.id,
                symbol: corrective.asset_class.clone(),
                side: corrective.side,
                order_type: OrderType::Market,
                quantity: (corrective.quantity / price).normalize(),
                price: None,
                stop_price: None,
                time_in_force: TimeInForce::GTC,
                execution_instructions: Vec::new(),
                algo_parameters: Default::default(),
                trader_id: "rebalancer".to_string(),
                desk: "portfolio".to_string(),
                strategy: "drift-rebalance".to_string(),
            };
            match self.place_order(order_request).await {
                Ok(order_id) => order_ids.push(order_id),
                Err(err) => warn!(
                    "Corrective order for {} not admitted: {}",
                    corrective.asset_class, err
                ),
            }
        }

        self.events
            .publish(EngineEvent::RebalanceExecuted {
                client_id: client.id,
                portfolio_id: request.portfolio_id,
                corrective_orders: order_ids.clone(),
                timestamp: self.clock.now(),
            })
            .await;

        Ok(order_ids)
    }

    // ============ Accessors ============

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    pub fn custody(&self) -> &CustodyLedger {
        &self.custody
    }

    pub fn rebalancer(&self) -> &PortfolioRebalancer {
        &self.rebalancer
    }

    pub fn dispatcher(&self) -> &SliceDispatcher {
        &self.dispatcher
    }

    /// Subscribe to the engine event stream
    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }
}
