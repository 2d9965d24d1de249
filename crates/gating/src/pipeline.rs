use atlas_core::Order;
use atlas_ports::{Compliance, PortResult, Risk};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Outcome of the admission pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Rejected(RejectReason),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Why an order was refused admission
///
/// Indeterminate results (errors, timeouts) are recorded separately from
/// genuine rule rejections so audit trails distinguish the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Compliance rules evaluated to false
    Compliance,
    /// Risk limits evaluated to false
    Risk,
    /// Compliance check errored or timed out - fail closed
    ComplianceUnavailable(String),
    /// Risk check errored or timed out - fail closed
    RiskUnavailable(String),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Compliance => write!(f, "Rejected by compliance"),
            RejectReason::Risk => write!(f, "Rejected by risk"),
            RejectReason::ComplianceUnavailable(msg) => {
                write!(f, "Compliance check unavailable: {}", msg)
            }
            RejectReason::RiskUnavailable(msg) => write!(f, "Risk check unavailable: {}", msg),
        }
    }
}

/// Admission pipeline composing the compliance and risk predicates
///
/// Both checks are potentially slow external calls; they run concurrently
/// under a bounded timeout and both results are awaited before deciding.
/// Compliance is reported first when both fail.
pub struct GatingPipeline {
    compliance: Arc<dyn Compliance>,
    risk: Arc<dyn Risk>,
    check_timeout: Duration,
}

impl GatingPipeline {
    pub fn new(
        compliance: Arc<dyn Compliance>,
        risk: Arc<dyn Risk>,
        check_timeout: Duration,
    ) -> Self {
        Self {
            compliance,
            risk,
            check_timeout,
        }
    }

    /// Gate an order request
    ///
    /// Returns [`Admission::Admitted`] only when both predicates return
    /// true within the timeout. Never mutates any state.
    pub async fn admit(&self, order: &Order) -> Admission {
        let (compliance_result, risk_result) = tokio::join!(
            timeout(self.check_timeout, self.compliance.evaluate(order)),
            timeout(self.check_timeout, self.risk.evaluate(order)),
        );

        if let Some(reason) = Self::resolve(compliance_result, true) {
            warn!("[GATING] order {} rejected: {}", order.id, reason);
            return Admission::Rejected(reason);
        }
        if let Some(reason) = Self::resolve(risk_result, false) {
            warn!("[GATING] order {} rejected: {}", order.id, reason);
            return Admission::Rejected(reason);
        }

        info!("[GATING] order {} admitted", order.id);
        Admission::Admitted
    }

    /// Map one predicate outcome to an optional rejection, fail-closed
    fn resolve(
        result: Result<PortResult<bool>, tokio::time::error::Elapsed>,
        is_compliance: bool,
    ) -> Option<RejectReason> {
        match result {
            Ok(Ok(true)) => None,
            Ok(Ok(false)) => Some(if is_compliance {
                RejectReason::Compliance
            } else {
                RejectReason::Risk
            }),
            Ok(Err(err)) => Some(Self::unavailable(err.to_string(), is_compliance)),
            Err(_) => Some(Self::unavailable("timed out".to_string(), is_compliance)),
        }
    }

    fn unavailable(msg: String, is_compliance: bool) -> RejectReason {
        if is_compliance {
            RejectReason::ComplianceUnavailable(msg)
        } else {
            RejectReason::RiskUnavailable(msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use atlas_core::{OrderType, Side, TimeInForce};
    use atlas_ports::PortError;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    struct Fixed(bool);

    #[async_trait]
    impl Compliance for Fixed {
        async fn evaluate(&self, _order: &Order) -> PortResult<bool> {
            Ok(self.0)
        }
    }

    #[async_trait]
    impl Risk for Fixed {
        async fn evaluate(&self, _order: &Order) -> PortResult<bool> {
            Ok(self.0)
        }
    }

    struct Failing;

    #[async_trait]
    impl Risk for Failing {
        async fn evaluate(&self, _order: &Order) -> PortResult<bool> {
            Err(PortError::Unavailable("connection refused".to_string()))
        }
    }

    struct Stalled;

    #[async_trait]
    impl Compliance for Stalled {
        async fn evaluate(&self, _order: &Order) -> PortResult<bool> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(true)
        }
    }

    fn order() -> Order {
        Order::new_with_time(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "BTC-USD",
            Side::Buy,
            OrderType::Market,
            dec!(10),
            None,
            None,
            TimeInForce::GTC,
            Utc::now(),
        )
    }

    fn pipeline(
        compliance: impl Compliance + 'static,
        risk: impl Risk + 'static,
    ) -> GatingPipeline {
        GatingPipeline::new(
            Arc::new(compliance),
            Arc::new(risk),
            Duration::from_secs(2),
        )
    }

    #[tokio::test]
    async fn test_admits_when_both_pass() {
        let gate = pipeline(Fixed(true), Fixed(true));
        assert_eq!(gate.admit(&order()).await, Admission::Admitted);
    }

    #[tokio::test]
    async fn test_compliance_rejection() {
        let gate = pipeline(Fixed(false), Fixed(true));
        assert_eq!(
            gate.admit(&order()).await,
            Admission::Rejected(RejectReason::Compliance)
        );
    }

    #[tokio::test]
    async fn test_risk_rejection() {
        let gate = pipeline(Fixed(true), Fixed(false));
        assert_eq!(
            gate.admit(&order()).await,
            Admission::Rejected(RejectReason::Risk)
        );
    }

    #[tokio::test]
    async fn test_compliance_reported_first_when_both_fail() {
        let gate = pipeline(Fixed(false), Fixed(false));
        assert_eq!(
            gate.admit(&order()).await,
            Admission::Rejected(RejectReason::Compliance)
        );
    }

    #[tokio::test]
    async fn test_fail_closed_on_error() {
        let gate = pipeline(Fixed(true), Failing);
        match gate.admit(&order()).await {
            Admission::Rejected(RejectReason::RiskUnavailable(msg)) => {
                assert!(msg.contains("connection refused"));
            }
            other => panic!("Expected RiskUnavailable, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_closed_on_timeout() {
        let gate = pipeline(Stalled, Fixed(true));
        match gate.admit(&order()).await {
            Admission::Rejected(RejectReason::ComplianceUnavailable(msg)) => {
                assert!(msg.contains("timed out"));
            }
            other => panic!("Expected ComplianceUnavailable, got {:?}", other),
        }
    }
}
