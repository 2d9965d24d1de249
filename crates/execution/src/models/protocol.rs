//! Slice Strategy Protocol
//!
//! Core trait for order decomposition. Implementations are deterministic,
//! pure functions of the order quantity and their configuration; the
//! dispatcher owns all timing and side effects.

use chrono::Duration;
use rust_decimal::Decimal;

/// One planned slice of a decomposed order
#[derive(Debug, Clone, PartialEq)]
pub struct SlicePlan {
    /// Position in the schedule, 0-based
    pub sequence: usize,
    /// Target quantity for this slice
    pub quantity: Decimal,
    /// Offset from schedule start when this slice should dispatch
    pub time_offset: Duration,
}

/// Decomposition strategy interface
///
/// Every implementation must produce slices whose quantities sum exactly
/// to the input quantity. All implementations must be thread-safe.
pub trait SliceStrategy: Send + Sync {
    /// Decompose a quantity into a timed slice schedule
    fn decompose(&self, quantity: Decimal) -> Vec<SlicePlan>;

    /// Get the strategy name for logging/debugging
    fn name(&self) -> &str;
}

/// Decimal places retained on every slice but the last
const SLICE_SCALE: u32 = 8;

/// Build an exact-sum schedule from per-slice fractions
///
/// Every slice but the last is rounded to eight decimal places; the final
/// slice absorbs the rounding remainder so the schedule sums exactly to
/// `quantity` regardless of the fraction vector.
pub fn build_slices(quantity: Decimal, fractions: &[Decimal], interval: Duration) -> Vec<SlicePlan> {
    let n = fractions.len();
    let mut slices = Vec::with_capacity(n);
    let mut remaining = quantity;

    for (i, fraction) in fractions.iter().enumerate() {
        let slice_qty = if i == n - 1 {
            remaining
        } else {
            let qty = (quantity * fraction).round_dp(SLICE_SCALE);
            remaining -= qty;
            qty
        };

        slices.push(SlicePlan {
            sequence: i,
            quantity: slice_qty,
            time_offset: interval * i as i32,
        });
    }

    slices
}

/// Evenly spaced dispatch interval for a window split into `n` slices
pub(crate) fn slice_interval(duration: Duration, n: usize) -> Duration {
    Duration::seconds((duration.num_seconds() / n.max(1) as i64).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exact_sum_with_skewed_fractions() {
        let fractions = vec![dec!(0.333333), dec!(0.333333), dec!(0.333334)];
        let slices = build_slices(dec!(100), &fractions, Duration::minutes(1));

        let total: Decimal = slices.iter().map(|s| s.quantity).sum();
        assert_eq!(total, dec!(100));
    }

    #[test]
    fn test_last_slice_absorbs_remainder() {
        // 1/7 does not terminate; all rounding lands on the final slice
        let fraction = Decimal::ONE / dec!(7);
        let fractions = vec![fraction; 7];
        let slices = build_slices(dec!(1), &fractions, Duration::minutes(1));

        let total: Decimal = slices.iter().map(|s| s.quantity).sum();
        assert_eq!(total, dec!(1));
        assert_ne!(slices[6].quantity, slices[0].quantity);
    }

    #[test]
    fn test_time_offsets_evenly_spaced() {
        let fractions = vec![dec!(0.25); 4];
        let slices = build_slices(dec!(8), &fractions, Duration::minutes(5));

        for (i, slice) in slices.iter().enumerate() {
            assert_eq!(slice.time_offset, Duration::minutes(5) * i as i32);
            assert_eq!(slice.sequence, i);
        }
    }
}
