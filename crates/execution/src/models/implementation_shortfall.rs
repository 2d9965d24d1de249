//! Implementation Shortfall Decomposition
//!
//! Strategy: front-load execution to trade market impact against timing
//! risk. Slice weights follow a monotonically decreasing urgency curve
//!
//! w(i) ∝ exp(-λ · i / (n-1))
//!
//! where λ is the configurable decay. High λ concentrates quantity early
//! (risk-averse); λ near zero approaches an even TWAP-like schedule.
//!
//! High λ:                   Low λ:
//!   ↑                         ↑
//!   │█                        │████
//!   │██                       │████
//!   │███                      │████
//!   │████                     │████
//!   └────→ time               └────→ time

use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use super::protocol::{SlicePlan, SliceStrategy, build_slices, slice_interval};

/// Implementation-Shortfall decomposition with exponential urgency decay
pub struct ImplementationShortfallModel {
    slice_count: usize,
    duration: Duration,
    urgency_decay: f64,
}

impl ImplementationShortfallModel {
    pub fn new(slice_count: usize, duration: Duration, urgency_decay: f64) -> Self {
        Self {
            slice_count: slice_count.max(1),
            duration,
            urgency_decay: urgency_decay.max(f64::EPSILON),
        }
    }

    /// Normalized, monotonically decreasing weight vector
    fn fractions(&self) -> Vec<Decimal> {
        let n = self.slice_count;
        if n == 1 {
            return vec![Decimal::ONE];
        }

        let raw: Vec<f64> = (0..n)
            .map(|i| (-self.urgency_decay * i as f64 / (n - 1) as f64).exp())
            .collect();
        let total: f64 = raw.iter().sum();

        raw.into_iter()
            .map(|w| Decimal::from_f64(w / total).unwrap_or(Decimal::ZERO))
            .collect()
    }
}

impl SliceStrategy for ImplementationShortfallModel {
    fn decompose(&self, quantity: Decimal) -> Vec<SlicePlan> {
        build_slices(
            quantity,
            &self.fractions(),
            slice_interval(self.duration, self.slice_count),
        )
    }

    fn name(&self) -> &str {
        "implementation_shortfall"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exact_sum() {
        let model = ImplementationShortfallModel::new(10, Duration::hours(1), 2.0);
        let slices = model.decompose(dec!(1000));

        let total: Decimal = slices.iter().map(|s| s.quantity).sum();
        assert_eq!(total, dec!(1000));
    }

    #[test]
    fn test_front_loaded_and_monotonic() {
        let model = ImplementationShortfallModel::new(8, Duration::hours(1), 3.0);
        let slices = model.decompose(dec!(1000));

        for pair in slices.windows(2) {
            assert!(
                pair[0].quantity >= pair[1].quantity,
                "slice quantities must not increase front to back: {:?}",
                slices.iter().map(|s| s.quantity).collect::<Vec<_>>()
            );
        }
        assert!(slices[0].quantity > slices[7].quantity);
    }

    #[test]
    fn test_higher_decay_front_loads_harder() {
        let patient = ImplementationShortfallModel::new(10, Duration::hours(1), 0.5);
        let urgent = ImplementationShortfallModel::new(10, Duration::hours(1), 5.0);

        let patient_first = patient.decompose(dec!(1000))[0].quantity;
        let urgent_first = urgent.decompose(dec!(1000))[0].quantity;

        assert!(urgent_first > patient_first);
    }

    #[test]
    fn test_single_slice() {
        let model = ImplementationShortfallModel::new(1, Duration::minutes(10), 2.0);
        let slices = model.decompose(dec!(42));

        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].quantity, dec!(42));
    }
}
