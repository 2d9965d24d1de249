//! TWAP (Time-Weighted Average Price) Decomposition
//!
//! Strategy: trade evenly over time.
//!
//! Timeline:
//! ├──────┼──────┼──────┼──────┤
//!    25%    25%    25%    25%
//!
//! Simple, robust, low information leakage; ignores volume patterns.
//! The division remainder lands on the last slice so the schedule sums
//! exactly to the parent quantity.

use chrono::Duration;
use rust_decimal::Decimal;

use super::protocol::{SlicePlan, SliceStrategy, build_slices, slice_interval};

/// TWAP decomposition: `slice_count` equal parts spaced evenly across the window
pub struct TwapModel {
    slice_count: usize,
    duration: Duration,
}

impl TwapModel {
    pub fn new(slice_count: usize, duration: Duration) -> Self {
        Self {
            slice_count: slice_count.max(1),
            duration,
        }
    }
}

impl SliceStrategy for TwapModel {
    fn decompose(&self, quantity: Decimal) -> Vec<SlicePlan> {
        let n = self.slice_count;
        let fraction = Decimal::ONE / Decimal::from(n as u64);
        let fractions = vec![fraction; n];

        build_slices(quantity, &fractions, slice_interval(self.duration, n))
    }

    fn name(&self) -> &str {
        "twap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_even_distribution() {
        let model = TwapModel::new(4, Duration::minutes(20));
        let slices = model.decompose(dec!(1000));

        assert_eq!(slices.len(), 4);
        for slice in &slices {
            assert_eq!(slice.quantity, dec!(250));
        }
    }

    #[test]
    fn test_exact_sum_with_remainder_on_last() {
        let model = TwapModel::new(3, Duration::minutes(9));
        let slices = model.decompose(dec!(100));

        let total: Decimal = slices.iter().map(|s| s.quantity).sum();
        assert_eq!(total, dec!(100));

        // All but the last slice are equal; the last absorbs the remainder
        assert_eq!(slices[0].quantity, slices[1].quantity);
        assert_eq!(
            slices[2].quantity,
            dec!(100) - slices[0].quantity - slices[1].quantity
        );
    }

    #[test]
    fn test_time_spacing() {
        let model = TwapModel::new(5, Duration::minutes(10));
        let slices = model.decompose(dec!(100));

        for (i, slice) in slices.iter().enumerate() {
            assert_eq!(slice.time_offset, Duration::minutes(2) * i as i32);
        }
    }

    #[test]
    fn test_single_slice() {
        let model = TwapModel::new(1, Duration::minutes(5));
        let slices = model.decompose(dec!(100));

        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].quantity, dec!(100));
        assert_eq!(slices[0].time_offset, Duration::zero());
    }

    #[test]
    fn test_tiny_quantity_still_exact() {
        let model = TwapModel::new(10, Duration::minutes(10));
        let slices = model.decompose(dec!(0.00000001));

        let total: Decimal = slices.iter().map(|s| s.quantity).sum();
        assert_eq!(total, dec!(0.00000001));
    }
}
