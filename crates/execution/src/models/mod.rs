//! Decomposition strategies for algorithmic order types

mod implementation_shortfall;
mod protocol;
mod twap;
mod vwap;

pub use implementation_shortfall::ImplementationShortfallModel;
pub use protocol::{SlicePlan, SliceStrategy, build_slices};
pub use twap::TwapModel;
pub use vwap::{FlatCurve, VwapModel};
