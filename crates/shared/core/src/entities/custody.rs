use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, ClientId};

/// Unique identifier for a custody holding
pub type HoldingId = Uuid;

/// Where and how a holding is kept
///
/// Each variant carries the setup data specific to that custody
/// arrangement; the surrounding holding record is shared by all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "type")]
pub enum CustodyType {
    /// Online wallet, fast access
    HotWallet { storage_location: String },
    /// Offline vault, slow access
    ColdStorage { storage_location: String },
    /// M-of-N signer set
    MultiSig { signers: Vec<String>, threshold: usize },
    /// Hardware security module
    Hsm { device_reference: String },
    /// Third-party institutional custodian
    InstitutionalCustody { custodian_name: String },
    /// Client holds the keys
    SelfCustody,
}

impl CustodyType {
    /// Short name matching the wire-level custody type codes
    pub fn code(&self) -> &'static str {
        match self {
            CustodyType::HotWallet { .. } => "HOT_WALLET",
            CustodyType::ColdStorage { .. } => "COLD_STORAGE",
            CustodyType::MultiSig { .. } => "MULTI_SIG",
            CustodyType::Hsm { .. } => "HSM",
            CustodyType::InstitutionalCustody { .. } => "INSTITUTIONAL_CUSTODY",
            CustodyType::SelfCustody => "SELF_CUSTODY",
        }
    }
}

impl std::fmt::Display for CustodyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Whether holdings are kept separate per client or pooled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SegregationType {
    #[default]
    Segregated,
    Omnibus,
}

/// Encumbrance status of a holding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncumbranceStatus {
    #[default]
    Free,
    Pledged,
    Restricted,
}

/// Per-client, per-asset custody position
///
/// Quantity is never negative. Holdings are never deleted; a holding
/// whose quantity reaches zero persists as history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustodyHolding {
    pub id: HoldingId,
    pub client_id: ClientId,
    pub account_id: AccountId,
    pub asset: String,
    pub quantity: Decimal,
    pub custody_type: CustodyType,
    pub segregation_type: SegregationType,
    pub encumbrance_status: EncumbranceStatus,
    pub insurance_coverage: Decimal,
    pub last_audit_date: DateTime<Utc>,
    pub next_audit_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustodyHolding {
    /// Standard audit cycle between scheduled custody audits
    pub const AUDIT_CYCLE_DAYS: i64 = 90;

    pub fn new(
        client_id: ClientId,
        account_id: AccountId,
        asset: impl Into<String>,
        quantity: Decimal,
        custody_type: CustodyType,
        segregation_type: SegregationType,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            account_id,
            asset: asset.into(),
            quantity,
            custody_type,
            segregation_type,
            encumbrance_status: EncumbranceStatus::Free,
            insurance_coverage: Decimal::ZERO,
            last_audit_date: timestamp,
            next_audit_date: timestamp + chrono::Duration::days(Self::AUDIT_CYCLE_DAYS),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    pub fn with_insurance(mut self, coverage: Decimal) -> Self {
        self.insurance_coverage = coverage;
        self
    }
}
