//! Engine configuration
//!
//! One serde-deserializable struct with sensible defaults; loaded from
//! JSON where deployments need overrides.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine name/identifier
    #[serde(default = "default_name")]
    pub name: String,

    /// Bound on each compliance/risk check, in milliseconds
    #[serde(default = "default_gating_timeout_ms")]
    pub gating_timeout_ms: u64,

    /// Allocation drift below this fraction triggers no corrective order
    #[serde(default = "default_rebalance_threshold")]
    pub rebalance_threshold: Decimal,

    /// Event bus channel capacity
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_name() -> String {
    "Atlas Institutional Engine".to_string()
}

fn default_gating_timeout_ms() -> u64 {
    2_000
}

fn default_rebalance_threshold() -> Decimal {
    dec!(0.01)
}

fn default_event_capacity() -> usize {
    1_024
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            gating_timeout_ms: default_gating_timeout_ms(),
            rebalance_threshold: default_rebalance_threshold(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from a JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn gating_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.gating_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.gating_timeout_ms, 2_000);
        assert_eq!(config.rebalance_threshold, dec!(0.01));
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = EngineConfig::from_json(r#"{"gating_timeout_ms": 500}"#).unwrap();
        assert_eq!(config.gating_timeout_ms, 500);
        assert_eq!(config.rebalance_threshold, dec!(0.01));
    }
}
