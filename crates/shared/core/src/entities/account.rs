use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ClientId;

/// Unique identifier for a prime brokerage account
pub type AccountId = Uuid;

/// Prime brokerage account type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Full prime services: execution, financing and custody
    #[default]
    Prime,
    /// Execution only, no financing or custody
    ExecutionOnly,
    /// Custody only, no trading permissions
    CustodyOnly,
}

/// Prime brokerage account belonging to one client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimeBrokerageAccount {
    pub id: AccountId,
    pub client_id: ClientId,
    pub account_type: AccountType,
    pub base_currency: String,
    /// Instrument classes this account may trade (SPOT, MARGIN, ...)
    pub trading_permissions: Vec<String>,
    pub credit_limit: Decimal,
    pub margin_requirement: Decimal,
    pub leverage_limit: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PrimeBrokerageAccount {
    pub fn new(
        client_id: ClientId,
        account_type: AccountType,
        base_currency: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            account_type,
            base_currency: base_currency.into(),
            trading_permissions: vec!["SPOT".to_string()],
            credit_limit: Decimal::ZERO,
            margin_requirement: Decimal::ZERO,
            leverage_limit: Decimal::ONE,
            is_active: true,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    pub fn with_permissions(mut self, permissions: Vec<String>) -> Self {
        self.trading_permissions = permissions;
        self
    }

    pub fn with_credit_limit(mut self, limit: Decimal) -> Self {
        self.credit_limit = limit;
        self
    }

    pub fn with_leverage_limit(mut self, limit: Decimal) -> Self {
        self.leverage_limit = limit;
        self
    }

    /// Returns true if the account may trade at all
    pub fn can_trade(&self) -> bool {
        self.is_active && self.account_type != AccountType::CustodyOnly
    }
}
