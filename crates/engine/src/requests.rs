//! Inbound request shapes
//!
//! Transport-agnostic request structs. Algo parameters arrive as an
//! ordered key/value map and are parsed into the typed configurations of
//! the execution crate; execution instructions are an enumerated set, so
//! unrecognized instructions fail at the deserialization boundary.

use atlas_core::{
    AccountId, ClientId, CustodyType, InstitutionType, OrderType, SegregationType, ServiceTier,
    Side, TimeInForce,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub use atlas_settlement::OtcTradeCommand;

/// Recognized execution instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionInstruction {
    /// Never take liquidity
    PostOnly,
    /// Dark pool participation is acceptable
    DarkPoolAllowed,
    /// Only reduce an existing position
    ReduceOnly,
}

/// Client onboarding request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardClient {
    pub institution_name: String,
    pub institution_type: InstitutionType,
    pub service_tier: ServiceTier,
    pub aum: Decimal,
    pub base_currency: String,
    pub credit_limit: Decimal,
}

/// Order placement request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub client_id: ClientId,
    pub account_id: AccountId,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    pub time_in_force: TimeInForce,
    #[serde(default)]
    pub execution_instructions: Vec<ExecutionInstruction>,
    /// Raw algo parameters; validated per order type before gating
    #[serde(default)]
    pub algo_parameters: BTreeMap<String, Decimal>,
    pub trader_id: String,
    pub desk: String,
    pub strategy: String,
}

/// Custody setup request
///
/// The custody type is serde-tagged, so type-specific setup data
/// (storage location, signer set, device reference) rides inline with
/// the type code on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupCustody {
    pub client_id: ClientId,
    pub account_id: AccountId,
    pub asset: String,
    pub quantity: Decimal,
    pub custody_type: CustodyType,
    pub insurance_coverage: Decimal,
    pub segregation_type: SegregationType,
}

/// Portfolio rebalance request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rebalance {
    pub client_id: ClientId,
    pub portfolio_id: Uuid,
    pub target_allocations: BTreeMap<String, Decimal>,
}
