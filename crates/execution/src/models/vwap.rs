//! VWAP (Volume-Weighted Average Price) Decomposition
//!
//! Strategy: trade proportionally to expected market volume.
//!
//! Volume curve:
//!      ↑
//!  ████│          ████
//!  ████│  ██      ████
//!  ████│ ████ ██  ████
//! ─────┼────────────────→
//!     Open   Midday  Close
//!
//! The curve itself is an injected collaborator: one normalized weight
//! per time bucket over the window. The model renormalizes defensively
//! so a misbehaving provider still yields an exact-sum schedule.

use atlas_ports::VolumeCurve;
use chrono::Duration;
use rust_decimal::Decimal;

use super::protocol::{SlicePlan, SliceStrategy, build_slices, slice_interval};

/// Flat volume curve (24/7 markets with no intraday pattern)
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatCurve;

impl VolumeCurve for FlatCurve {
    fn weights(&self, _symbol: &str, buckets: usize) -> Vec<Decimal> {
        let n = buckets.max(1);
        vec![Decimal::ONE / Decimal::from(n as u64); n]
    }
}

/// VWAP decomposition: slice quantity follows the bucket weight curve
pub struct VwapModel {
    weights: Vec<Decimal>,
    duration: Duration,
}

impl VwapModel {
    /// Create from a bucket weight vector
    ///
    /// Weights are normalized to sum to 1; a degenerate vector (empty or
    /// non-positive total) collapses to a single immediate slice.
    pub fn new(weights: Vec<Decimal>, duration: Duration) -> Self {
        let total: Decimal = weights.iter().sum();
        let weights = if weights.is_empty() || total <= Decimal::ZERO {
            vec![Decimal::ONE]
        } else {
            weights.into_iter().map(|w| w / total).collect()
        };
        Self { weights, duration }
    }
}

impl SliceStrategy for VwapModel {
    fn decompose(&self, quantity: Decimal) -> Vec<SlicePlan> {
        build_slices(
            quantity,
            &self.weights,
            slice_interval(self.duration, self.weights.len()),
        )
    }

    fn name(&self) -> &str {
        "vwap"
    }
}
