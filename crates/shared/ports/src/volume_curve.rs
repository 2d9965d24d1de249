use rust_decimal::Decimal;

/// Port for historical intraday volume curves
///
/// Returns one weight per time bucket over the execution window, expected
/// to sum to 1. The VWAP slicer renormalizes defensively, so a provider
/// returning unnormalized weights still yields an exact-sum schedule.
pub trait VolumeCurve: Send + Sync {
    /// Normalized volume weights for `buckets` intervals of the window
    fn weights(&self, symbol: &str, buckets: usize) -> Vec<Decimal>;
}
