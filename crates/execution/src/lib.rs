//! Atlas Algorithmic Execution
//!
//! Decomposes large institutional orders into timed child slices and
//! dispatches them from a single time-ordered queue shared by all orders.
//!
//! ```text
//! Order (TWAP/VWAP/IS) ──► SliceStrategy::decompose ──► [SlicePlan]
//!                                                           │
//!                         ┌─────────────────────────────────▼─┐
//!                         │            SliceDispatcher         │
//!                         │  time-ordered queue, all orders    │
//!                         └───────┬────────────────────────────┘
//!                                 │ due
//!                    mark DISPATCHED, submit to venue
//!                                 │ fill
//!                        apply_fill on parent order
//! ```
//!
//! Decomposition is a deterministic, pure function of the order quantity
//! and its typed algo parameters; every strategy produces slices whose
//! quantities sum exactly to the parent quantity.

mod dispatcher;
mod error;
pub mod models;
mod params;

pub use dispatcher::SliceDispatcher;
pub use error::{Error, Result};
pub use models::{
    FlatCurve, ImplementationShortfallModel, SlicePlan, SliceStrategy, TwapModel, VwapModel,
};
pub use params::AlgoParams;

use atlas_ports::VolumeCurve;

/// Build the decomposition strategy for validated algo parameters
///
/// VWAP pulls its weight vector from the injected volume curve; the other
/// strategies are self-contained.
pub fn strategy_for(
    params: &AlgoParams,
    symbol: &str,
    curve: &dyn VolumeCurve,
) -> Box<dyn SliceStrategy> {
    match params {
        AlgoParams::Twap {
            duration_minutes,
            slice_count,
        } => Box::new(TwapModel::new(
            *slice_count,
            chrono::Duration::minutes(*duration_minutes),
        )),
        AlgoParams::Vwap {
            duration_minutes,
            bucket_count,
        } => {
            let weights = curve.weights(symbol, *bucket_count);
            Box::new(VwapModel::new(
                weights,
                chrono::Duration::minutes(*duration_minutes),
            ))
        }
        AlgoParams::ImplementationShortfall {
            duration_minutes,
            slice_count,
            urgency_decay,
        } => Box::new(ImplementationShortfallModel::new(
            *slice_count,
            chrono::Duration::minutes(*duration_minutes),
            *urgency_decay,
        )),
    }
}
