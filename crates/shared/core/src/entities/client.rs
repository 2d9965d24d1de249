use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for an institutional client
pub type ClientId = Uuid;

/// Category of institution being onboarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstitutionType {
    HedgeFund,
    AssetManager,
    FamilyOffice,
    PensionFund,
    Bank,
    BrokerDealer,
    MarketMaker,
    ProprietaryTrading,
    CorporateTreasury,
}

/// Service tier granted at onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceTier {
    #[default]
    Basic,
    Premium,
    Enterprise,
}

/// An onboarded institutional client
///
/// Immutable after onboarding except through an explicit registry update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub institution_name: String,
    pub institution_type: InstitutionType,
    pub service_tier: ServiceTier,
    /// Assets under management
    pub aum: Decimal,
    pub risk_tolerance: String,
    pub credit_limit: Decimal,
    /// Margin requirements keyed by requirement name (initial, maintenance, ...)
    pub margin_requirements: HashMap<String, Decimal>,
    pub is_active: bool,
    pub onboarded_at: DateTime<Utc>,
}

impl Client {
    pub fn new(
        institution_name: impl Into<String>,
        institution_type: InstitutionType,
        service_tier: ServiceTier,
        aum: Decimal,
        credit_limit: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            institution_name: institution_name.into(),
            institution_type,
            service_tier,
            aum,
            risk_tolerance: "MODERATE".to_string(),
            credit_limit,
            margin_requirements: HashMap::new(),
            is_active: true,
            onboarded_at: timestamp,
        }
    }

    pub fn with_risk_tolerance(mut self, tolerance: impl Into<String>) -> Self {
        self.risk_tolerance = tolerance.into();
        self
    }

    pub fn with_margin_requirement(mut self, name: impl Into<String>, value: Decimal) -> Self {
        self.margin_requirements.insert(name.into(), value);
        self
    }
}
