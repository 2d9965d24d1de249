//! Engine error taxonomy
//!
//! The inbound surface of the whole engine. Component errors convert
//! transparently; the named variants cover the request-level outcomes
//! that have no single owning component.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed request - rejected before gating, never persisted
    #[error("Validation error: {0}")]
    Validation(String),

    /// Compliance evaluated to false; an audit order was recorded as CANCELLED
    #[error("Order rejected by compliance: {0}")]
    ComplianceRejected(String),

    /// Risk evaluated to false; an audit order was recorded as CANCELLED
    #[error("Order rejected by risk: {0}")]
    RiskRejected(String),

    /// A gating check errored or timed out - fail closed, nothing persisted
    #[error("External service timeout: {0}")]
    ExternalServiceTimeout(String),

    #[error(transparent)]
    Lifecycle(#[from] atlas_order_manager::Error),

    #[error(transparent)]
    Custody(#[from] atlas_custody::Error),

    #[error(transparent)]
    Settlement(#[from] atlas_settlement::Error),

    #[error(transparent)]
    Rebalance(#[from] atlas_rebalancer::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
