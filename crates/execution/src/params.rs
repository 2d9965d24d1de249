//! Typed algorithmic order parameters
//!
//! Inbound requests carry algo parameters as a key/value map. Each
//! algorithmic order type recognizes a fixed set of keys; anything else
//! is rejected rather than silently ignored.

use atlas_core::OrderType;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Validated per-type algorithm configuration
#[derive(Debug, Clone, PartialEq)]
pub enum AlgoParams {
    Twap {
        duration_minutes: i64,
        slice_count: usize,
    },
    Vwap {
        duration_minutes: i64,
        bucket_count: usize,
    },
    ImplementationShortfall {
        duration_minutes: i64,
        slice_count: usize,
        /// Decay of the urgency curve; larger values front-load harder
        urgency_decay: f64,
    },
}

impl AlgoParams {
    pub const DEFAULT_DURATION_MINUTES: i64 = 60;
    pub const DEFAULT_SLICE_COUNT: usize = 10;
    pub const DEFAULT_BUCKET_COUNT: usize = 12;
    pub const DEFAULT_URGENCY_DECAY: f64 = 2.0;

    /// Parse and validate raw request parameters for an order type
    ///
    /// Missing keys take the documented defaults; unrecognized keys fail.
    pub fn parse(order_type: OrderType, raw: &BTreeMap<String, Decimal>) -> Result<Self> {
        let recognized: &[&str] = match order_type {
            OrderType::Twap => &["duration_minutes", "slice_count"],
            OrderType::Vwap => &["duration_minutes", "bucket_count"],
            OrderType::ImplementationShortfall => {
                &["duration_minutes", "slice_count", "urgency_decay"]
            }
            other => return Err(Error::NotAlgorithmic(other)),
        };

        for key in raw.keys() {
            if !recognized.contains(&key.as_str()) {
                return Err(Error::UnrecognizedParameter {
                    key: key.clone(),
                    order_type,
                });
            }
        }

        let duration_minutes =
            int_param(raw, "duration_minutes", Self::DEFAULT_DURATION_MINUTES)?;

        match order_type {
            OrderType::Twap => Ok(AlgoParams::Twap {
                duration_minutes,
                slice_count: count_param(raw, "slice_count", Self::DEFAULT_SLICE_COUNT)?,
            }),
            OrderType::Vwap => Ok(AlgoParams::Vwap {
                duration_minutes,
                bucket_count: count_param(raw, "bucket_count", Self::DEFAULT_BUCKET_COUNT)?,
            }),
            OrderType::ImplementationShortfall => {
                let urgency_decay = match raw.get("urgency_decay") {
                    None => Self::DEFAULT_URGENCY_DECAY,
                    Some(value) => {
                        let decay = value.to_f64().unwrap_or(f64::NAN);
                        if !(decay > 0.0) {
                            return Err(Error::InvalidParameter {
                                key: "urgency_decay".to_string(),
                                message: format!("must be positive, got {}", value),
                            });
                        }
                        decay
                    }
                };
                Ok(AlgoParams::ImplementationShortfall {
                    duration_minutes,
                    slice_count: count_param(raw, "slice_count", Self::DEFAULT_SLICE_COUNT)?,
                    urgency_decay,
                })
            }
            _ => unreachable!("non-algorithmic types rejected above"),
        }
    }

    /// Execution window length
    pub fn duration(&self) -> chrono::Duration {
        let minutes = match self {
            AlgoParams::Twap { duration_minutes, .. }
            | AlgoParams::Vwap { duration_minutes, .. }
            | AlgoParams::ImplementationShortfall { duration_minutes, .. } => *duration_minutes,
        };
        chrono::Duration::minutes(minutes)
    }
}

fn int_param(raw: &BTreeMap<String, Decimal>, key: &str, default: i64) -> Result<i64> {
    match raw.get(key) {
        None => Ok(default),
        Some(value) => {
            let parsed = value.to_i64().filter(|v| *v > 0);
            parsed.ok_or_else(|| Error::InvalidParameter {
                key: key.to_string(),
                message: format!("must be a positive integer, got {}", value),
            })
        }
    }
}

fn count_param(raw: &BTreeMap<String, Decimal>, key: &str, default: usize) -> Result<usize> {
    match raw.get(key) {
        None => Ok(default),
        Some(value) => {
            let parsed = value.to_usize().filter(|v| *v >= 1);
            parsed.ok_or_else(|| Error::InvalidParameter {
                key: key.to_string(),
                message: format!("must be an integer >= 1, got {}", value),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn map(entries: &[(&str, Decimal)]) -> BTreeMap<String, Decimal> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn test_twap_defaults() {
        let params = AlgoParams::parse(OrderType::Twap, &BTreeMap::new()).unwrap();
        assert_eq!(
            params,
            AlgoParams::Twap {
                duration_minutes: 60,
                slice_count: 10
            }
        );
    }

    #[test]
    fn test_twap_explicit_values() {
        let raw = map(&[("duration_minutes", dec!(30)), ("slice_count", dec!(6))]);
        let params = AlgoParams::parse(OrderType::Twap, &raw).unwrap();
        assert_eq!(
            params,
            AlgoParams::Twap {
                duration_minutes: 30,
                slice_count: 6
            }
        );
    }

    #[test]
    fn test_unrecognized_key_rejected() {
        let raw = map(&[("participation_rate", dec!(0.1))]);
        assert!(matches!(
            AlgoParams::parse(OrderType::Twap, &raw),
            Err(Error::UnrecognizedParameter { .. })
        ));
    }

    #[test]
    fn test_key_for_wrong_type_rejected() {
        // bucket_count belongs to VWAP, not TWAP
        let raw = map(&[("bucket_count", dec!(8))]);
        assert!(matches!(
            AlgoParams::parse(OrderType::Twap, &raw),
            Err(Error::UnrecognizedParameter { .. })
        ));
    }

    #[test]
    fn test_non_algorithmic_type_rejected() {
        assert!(matches!(
            AlgoParams::parse(OrderType::Limit, &BTreeMap::new()),
            Err(Error::NotAlgorithmic(OrderType::Limit))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let raw = map(&[("slice_count", dec!(0))]);
        assert!(matches!(
            AlgoParams::parse(OrderType::Twap, &raw),
            Err(Error::InvalidParameter { .. })
        ));

        let raw = map(&[("urgency_decay", dec!(-1))]);
        assert!(matches!(
            AlgoParams::parse(OrderType::ImplementationShortfall, &raw),
            Err(Error::InvalidParameter { .. })
        ));
    }
}
